use clarabel::algebra::CscMatrix;
use clarabel::solver::{
    DefaultSettings, DefaultSolver, IPSolver, SolverStatus,
    SupportedConeT::{NonnegativeConeT, PSDTriangleConeT, ZeroConeT},
};
use nalgebra::DMatrix;
use tracing::debug;

use crate::{ConeModel, SdpSolution, SdpStatus, SolverBackend};
use covsteer_types::Result;

/// Clarabel-based SDP solver (pure Rust interior point)
pub struct ClarabelSolver {
    verbose: bool,
    max_iter: u32,
    tol_gap_abs: f64,
    tol_gap_rel: f64,
}

impl ClarabelSolver {
    /// Create a new Clarabel solver with default settings
    pub fn new() -> Self {
        ClarabelSolver {
            verbose: false,
            max_iter: 10000,
            tol_gap_abs: 1e-8,
            tol_gap_rel: 1e-8,
        }
    }

    /// Create solver with custom settings
    pub fn with_params(max_iter: u32, tolerance: f64) -> Self {
        ClarabelSolver {
            verbose: false,
            max_iter,
            tol_gap_abs: tolerance,
            tol_gap_rel: tolerance,
        }
    }
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        Self::new()
    }
}

impl SolverBackend for ClarabelSolver {
    fn solve(&self, model: &ConeModel) -> Result<SdpSolution> {
        model.validate()?;

        let n = model.num_vars();
        let n_eq = model.num_equalities();
        let n_ub = model.num_inequalities();
        let n_psd: usize = model
            .psd_blocks
            .iter()
            .map(|block| crate::svec_len(block.dim))
            .sum();

        // Clarabel standard form: A x + s = b, s in K.
        // Zero cone rows enforce A_eq x = b_eq, nonnegative cone rows
        // enforce A_ub x <= b_ub, and for each PSD block the slack
        // s = c - (-a) x = a x + c is the triangle vectorization of J.
        let n_rows = n_eq + n_ub + n_psd;
        let mut a_all = DMatrix::zeros(n_rows, n);
        let mut b_all = vec![0.0; n_rows];

        a_all.view_mut((0, 0), (n_eq, n)).copy_from(&model.a_eq);
        for i in 0..n_eq {
            b_all[i] = model.b_eq[i];
        }

        a_all.view_mut((n_eq, 0), (n_ub, n)).copy_from(&model.a_ub);
        for i in 0..n_ub {
            b_all[n_eq + i] = model.b_ub[i];
        }

        let mut cones = Vec::new();
        if n_eq > 0 {
            cones.push(ZeroConeT(n_eq));
        }
        if n_ub > 0 {
            cones.push(NonnegativeConeT(n_ub));
        }

        let mut offset = n_eq + n_ub;
        for block in &model.psd_blocks {
            let rows = crate::svec_len(block.dim);
            a_all
                .view_mut((offset, 0), (rows, n))
                .copy_from(&(-&block.a));
            for i in 0..rows {
                b_all[offset + i] = block.c[i];
            }
            cones.push(PSDTriangleConeT(block.dim));
            offset += rows;
        }

        // Linear objective: P = 0
        let p_csc = CscMatrix {
            m: n,
            n,
            colptr: vec![0; n + 1],
            rowval: Vec::new(),
            nzval: Vec::new(),
        };
        let a_csc = to_clarabel_csc(&a_all);

        let mut settings = DefaultSettings::default();
        settings.verbose = self.verbose;
        settings.max_iter = self.max_iter;
        settings.tol_gap_abs = self.tol_gap_abs;
        settings.tol_gap_rel = self.tol_gap_rel;

        debug!(
            vars = n,
            equalities = n_eq,
            inequalities = n_ub,
            psd_blocks = model.psd_blocks.len(),
            "solving conic program"
        );

        let mut solver = DefaultSolver::new(
            &p_csc,
            model.q.as_slice(),
            &a_csc,
            &b_all,
            &cones,
            settings,
        );

        solver.solve();

        let status = match solver.solution.status {
            SolverStatus::Solved => SdpStatus::Optimal,
            SolverStatus::PrimalInfeasible => SdpStatus::PrimalInfeasible,
            SolverStatus::DualInfeasible => SdpStatus::DualInfeasible,
            SolverStatus::MaxIterations => SdpStatus::MaxIterations,
            _ => SdpStatus::Unsolved,
        };

        debug!(?status, iterations = solver.info.iterations, "solver finished");

        Ok(SdpSolution {
            x: solver.solution.x.clone(),
            status,
            objective: solver.solution.obj_val,
            iterations: solver.info.iterations as usize,
        })
    }
}

/// Convert DMatrix to Clarabel CSC format (full matrix)
fn to_clarabel_csc(mat: &DMatrix<f64>) -> CscMatrix<f64> {
    let mut colptr = vec![0];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    let sparsity_threshold = 1e-12;

    for col in 0..mat.ncols() {
        for row in 0..mat.nrows() {
            let val = mat[(row, col)];
            if val.abs() > sparsity_threshold {
                rowval.push(row);
                nzval.push(val);
            }
        }
        colptr.push(nzval.len());
    }

    CscMatrix {
        m: mat.nrows(),
        n: mat.ncols(),
        colptr,
        rowval,
        nzval,
    }
}
