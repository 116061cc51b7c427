use crate::*;
use nalgebra::{DMatrix, DVector};

const SQRT2: f64 = std::f64::consts::SQRT_2;

/// min x subject to [[x, off], [off, x]] PSD, i.e. x >= |off|
fn diagonal_bound_model(off: f64) -> ConeModel {
    // svec rows: (0,0), (0,1) scaled by sqrt(2), (1,1)
    let a = DMatrix::from_row_slice(3, 1, &[1.0, 0.0, 1.0]);
    let c = DVector::from_vec(vec![0.0, SQRT2 * off, 0.0]);

    ConeModel {
        q: DVector::from_vec(vec![1.0]),
        a_eq: DMatrix::zeros(0, 1),
        b_eq: DVector::zeros(0),
        a_ub: DMatrix::zeros(0, 1),
        b_ub: DVector::zeros(0),
        psd_blocks: vec![PsdBlock { dim: 2, a, c }],
        var_meta: vec![VarMeta::StateCov {
            step: 0,
            row: 0,
            col: 0,
        }],
    }
}

#[test]
fn model_validation_catches_bad_shapes() {
    let mut model = diagonal_bound_model(1.0);
    assert!(model.validate().is_ok());
    assert_eq!(model.num_vars(), 1);

    model.psd_blocks[0].a = DMatrix::zeros(2, 1);
    assert!(model.validate().is_err());
}

#[test]
fn psd_cone_binds_at_optimum() {
    let model = diagonal_bound_model(1.0);
    let solver = ClarabelSolver::new();
    let solution = solver.solve(&model).unwrap();

    assert_eq!(solution.status, SdpStatus::Optimal);
    // [[x, 1], [1, x]] PSD requires x >= 1; objective pushes to x = 1
    assert!((solution.x[0] - 1.0).abs() < 1e-5);
    assert!((solution.objective - 1.0).abs() < 1e-5);
}

#[test]
fn equality_pin_overrides_objective() {
    let mut model = diagonal_bound_model(1.0);
    model.a_eq = DMatrix::from_row_slice(1, 1, &[1.0]);
    model.b_eq = DVector::from_vec(vec![3.0]);

    let solver = ClarabelSolver::new();
    let solution = solver.solve(&model).unwrap();

    assert_eq!(solution.status, SdpStatus::Optimal);
    assert!((solution.x[0] - 3.0).abs() < 1e-6);
}

#[test]
fn conflicting_cones_report_infeasible() {
    // PSD block forces x >= 2 while the inequality caps x <= 1
    let mut model = diagonal_bound_model(2.0);
    model.a_ub = DMatrix::from_row_slice(1, 1, &[1.0]);
    model.b_ub = DVector::from_vec(vec![1.0]);

    let solver = ClarabelSolver::new();
    let solution = solver.solve(&model).unwrap();

    assert_eq!(solution.status, SdpStatus::PrimalInfeasible);
}

#[test]
fn svec_len_triangle_numbers() {
    assert_eq!(svec_len(1), 1);
    assert_eq!(svec_len(2), 3);
    assert_eq!(svec_len(3), 6);
}
