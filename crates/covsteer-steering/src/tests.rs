use crate::*;
use nalgebra::{DMatrix, DVector};

use covsteer_solver::{SdpSolution, SdpStatus, VarMeta};
use covsteer_types::{CovSteerError, LinearSystem, PathBound, SteeringProblem};

fn small_problem() -> SteeringProblem {
    let a = DMatrix::from_row_slice(2, 2, &[1.0, 0.1, -0.3, 1.0]);
    let b = DMatrix::from_row_slice(2, 1, &[0.7, 0.4]);
    let w = DMatrix::identity(2, 2) * 0.1;
    let sys = LinearSystem::new(a, b, w, 2);
    SteeringProblem::new(
        sys,
        DMatrix::identity(2, 2) * 3.0,
        DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 0.5]),
    )
}

#[test]
fn layout_indices_are_disjoint_and_dense() {
    let layout = VarLayout::new(2, 1, 2);
    // 3 triangles of 3 + 2 cross of 2 + 2 moments of 1
    assert_eq!(layout.num_vars(), 15);

    let mut seen = vec![false; layout.num_vars()];
    for k in 0..=2 {
        for c in 0..2 {
            for r in 0..=c {
                seen[layout.sigma(k, r, c)] = true;
            }
        }
    }
    for k in 0..2 {
        for r in 0..2 {
            seen[layout.cross(k, r, 0)] = true;
        }
        seen[layout.input_moment(k, 0, 0)] = true;
    }
    assert!(seen.iter().all(|&s| s));

    // Symmetric entries alias the same variable
    assert_eq!(layout.sigma(1, 0, 1), layout.sigma(1, 1, 0));

    let meta = layout.var_meta();
    assert_eq!(meta.len(), 15);
    assert_eq!(
        meta[0],
        VarMeta::StateCov {
            step: 0,
            row: 0,
            col: 0
        }
    );
}

#[test]
fn builder_counts_and_objective() {
    let problem = small_problem();
    let model = SdpBuilder::build(&problem).unwrap();

    assert_eq!(model.num_vars(), 15);
    // 2 boundary pins of 3 rows each + 2 recursion steps of 3 rows
    assert_eq!(model.num_equalities(), 12);
    assert_eq!(model.num_inequalities(), 0);
    assert_eq!(model.psd_blocks.len(), 2);
    assert_eq!(model.psd_blocks[0].dim, 3);

    // Objective touches exactly the M_k diagonals
    let layout = VarLayout::new(2, 1, 2);
    let expected: Vec<usize> = (0..2).map(|k| layout.input_moment(k, 0, 0)).collect();
    for i in 0..model.num_vars() {
        if expected.contains(&i) {
            assert_eq!(model.q[i], 1.0);
        } else {
            assert_eq!(model.q[i], 0.0);
        }
    }
}

#[test]
fn recursion_rows_accept_propagated_covariances() {
    // With P = 0 and M = 0 the recursion reduces to
    // Sigma_{k+1} = A Sigma_k A^T + W; an assignment built that way
    // must satisfy every equality row exactly.
    let mut problem = small_problem();
    let sys = &problem.system;

    let sigma0 = problem.sigma_initial.clone();
    let sigma1 = &sys.a * &sigma0 * sys.a.transpose() + &sys.w;
    let sigma2 = &sys.a * &sigma1 * sys.a.transpose() + &sys.w;
    problem.sigma_terminal = sigma2.clone();

    let model = SdpBuilder::build(&problem).unwrap();
    let layout = VarLayout::new(2, 1, 2);

    let mut x = DVector::zeros(model.num_vars());
    for (k, sigma) in [&sigma0, &sigma1, &sigma2].iter().enumerate() {
        for c in 0..2 {
            for r in 0..=c {
                x[layout.sigma(k, r, c)] = sigma[(r, c)];
            }
        }
    }

    let residual = &model.a_eq * &x - &model.b_eq;
    assert!(residual.amax() < 1e-9);
}

#[test]
fn psd_blocks_use_scaled_triangle_rows() {
    let problem = small_problem();
    let model = SdpBuilder::build(&problem).unwrap();
    let layout = VarLayout::new(2, 1, 2);

    let block = &model.psd_blocks[0];
    // Rows: (0,0), (0,1), (1,1), (0,2), (1,2), (2,2); columns 2 of the
    // joint block come from P_0
    assert_eq!(block.a[(0, layout.sigma(0, 0, 0))], 1.0);
    assert_eq!(
        block.a[(1, layout.sigma(0, 0, 1))],
        std::f64::consts::SQRT_2
    );
    assert_eq!(block.a[(2, layout.sigma(0, 1, 1))], 1.0);
    assert_eq!(
        block.a[(3, layout.cross(0, 0, 0))],
        std::f64::consts::SQRT_2
    );
    assert_eq!(
        block.a[(4, layout.cross(0, 1, 0))],
        std::f64::consts::SQRT_2
    );
    assert_eq!(block.a[(5, layout.input_moment(0, 0, 0))], 1.0);
    assert!(block.c.amax() == 0.0);
}

#[test]
fn path_bound_adds_one_inequality() {
    let problem = small_problem().with_path_bound(PathBound {
        step: 1,
        row: 0,
        col: 0,
        limit: 2.5,
    });
    let model = SdpBuilder::build(&problem).unwrap();
    let layout = VarLayout::new(2, 1, 2);

    assert_eq!(model.num_inequalities(), 1);
    assert_eq!(model.a_ub[(0, layout.sigma(1, 0, 0))], 1.0);
    assert_eq!(model.b_ub[0], 2.5);
}

#[test]
fn builder_rejects_malformed_problems() {
    let mut problem = small_problem();
    problem.sigma_initial = DMatrix::identity(3, 3);
    assert!(matches!(
        SdpBuilder::build(&problem),
        Err(CovSteerError::Dimension(_))
    ));
}

#[test]
fn extract_maps_infeasible_status() {
    let problem = small_problem();
    let raw = SdpSolution {
        x: Vec::new(),
        status: SdpStatus::PrimalInfeasible,
        objective: f64::NAN,
        iterations: 7,
    };
    assert!(matches!(
        SteeringSolution::extract(&problem, &raw),
        Err(CovSteerError::Infeasible(_))
    ));

    let raw = SdpSolution {
        x: Vec::new(),
        status: SdpStatus::MaxIterations,
        objective: f64::NAN,
        iterations: 10000,
    };
    assert!(matches!(
        SteeringSolution::extract(&problem, &raw),
        Err(CovSteerError::SolverError(_))
    ));
}

#[test]
fn extract_rebuilds_symmetric_matrices() {
    let problem = small_problem();
    let layout = VarLayout::new(2, 1, 2);
    let mut x = vec![0.0; layout.num_vars()];
    x[layout.sigma(1, 0, 1)] = 0.25;
    x[layout.cross(0, 1, 0)] = -0.5;
    x[layout.input_moment(1, 0, 0)] = 2.0;

    let raw = SdpSolution {
        x,
        status: SdpStatus::Optimal,
        objective: 2.0,
        iterations: 3,
    };
    let solution = SteeringSolution::extract(&problem, &raw).unwrap();

    assert_eq!(solution.sigma.len(), 3);
    assert_eq!(solution.cross.len(), 2);
    assert_eq!(solution.sigma[1][(0, 1)], 0.25);
    assert_eq!(solution.sigma[1][(1, 0)], 0.25);
    assert_eq!(solution.cross[0][(1, 0)], -0.5);
    assert_eq!(solution.input_moment[1][(0, 0)], 2.0);
    assert_eq!(solution.objective, 2.0);
}

#[test]
fn gains_recover_cross_terms() {
    let sigma = DMatrix::from_row_slice(2, 2, &[2.0, 0.3, 0.3, 1.5]);
    let cross = DMatrix::from_row_slice(2, 1, &[0.5, -0.2]);
    let solution = SteeringSolution {
        sigma: vec![sigma.clone(), DMatrix::identity(2, 2)],
        cross: vec![cross.clone()],
        input_moment: vec![DMatrix::from_element(1, 1, 1.0)],
        objective: 1.0,
        iterations: 1,
    };

    let gains = extract_gains(&solution, DEFAULT_COND_LIMIT).unwrap();
    assert_eq!(gains.len(), 1);
    assert_eq!(gains[0].nrows(), 1);
    assert_eq!(gains[0].ncols(), 2);

    // (K Sigma)^T must reproduce P
    let recovered = (&gains[0] * &sigma).transpose();
    assert!((recovered - cross).amax() < 1e-12);
}

#[test]
fn gains_reject_singular_covariance() {
    let solution = SteeringSolution {
        sigma: vec![
            DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 0.0]),
            DMatrix::identity(2, 2),
        ],
        cross: vec![DMatrix::zeros(2, 1)],
        input_moment: vec![DMatrix::zeros(1, 1)],
        objective: 0.0,
        iterations: 1,
    };

    assert!(matches!(
        extract_gains(&solution, DEFAULT_COND_LIMIT),
        Err(CovSteerError::GainExtraction { step: 0, .. })
    ));
}

#[test]
fn gains_respect_condition_limit() {
    let solution = SteeringSolution {
        sigma: vec![
            DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1e-9]),
            DMatrix::identity(2, 2),
        ],
        cross: vec![DMatrix::zeros(2, 1)],
        input_moment: vec![DMatrix::zeros(1, 1)],
        objective: 0.0,
        iterations: 1,
    };

    // Well inside the default limit but outside a strict one
    assert!(extract_gains(&solution, 1e12).is_ok());
    assert!(extract_gains(&solution, 1e6).is_err());
}
