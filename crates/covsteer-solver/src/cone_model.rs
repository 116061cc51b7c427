use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use covsteer_types::{CovSteerError, Result};

/// Variable metadata for tracking which matrix entry a column represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VarMeta {
    /// Entry (row, col) of the state covariance Sigma_step
    StateCov { step: usize, row: usize, col: usize },
    /// Entry (row, col) of the cross term P_step
    CrossTerm { step: usize, row: usize, col: usize },
    /// Entry (row, col) of the input second moment M_step
    InputMoment { step: usize, row: usize, col: usize },
}

/// Length of the scaled upper-triangular vectorization of a dim x dim
/// symmetric matrix
pub fn svec_len(dim: usize) -> usize {
    dim * (dim + 1) / 2
}

/// One PSD-cone constraint: the symmetric matrix J with
/// svec(J) = a x + c must be positive semidefinite.
///
/// Rows follow column-major upper-triangle order with off-diagonal
/// rows scaled by sqrt(2), matching the solver's triangle convention.
#[derive(Debug, Clone)]
pub struct PsdBlock {
    pub dim: usize,
    pub a: DMatrix<f64>,
    pub c: DVector<f64>,
}

/// Conic program in standard form:
/// minimize q^T x
/// subject to A_eq x = b_eq
///            A_ub x <= b_ub
///            mat(a x + c) PSD for each PSD block
#[derive(Debug, Clone)]
pub struct ConeModel {
    /// Linear objective q
    pub q: DVector<f64>,
    /// Equality constraint matrix
    pub a_eq: DMatrix<f64>,
    /// Equality right-hand side
    pub b_eq: DVector<f64>,
    /// Upper-bound (inequality) constraint matrix
    pub a_ub: DMatrix<f64>,
    /// Upper-bound right-hand side
    pub b_ub: DVector<f64>,
    /// PSD cone blocks
    pub psd_blocks: Vec<PsdBlock>,
    /// Variable metadata
    pub var_meta: Vec<VarMeta>,
}

impl ConeModel {
    /// Get number of variables
    pub fn num_vars(&self) -> usize {
        self.q.len()
    }

    /// Get number of equality rows
    pub fn num_equalities(&self) -> usize {
        self.b_eq.len()
    }

    /// Get number of inequality rows
    pub fn num_inequalities(&self) -> usize {
        self.b_ub.len()
    }

    /// Validate model dimensions
    pub fn validate(&self) -> Result<()> {
        let n = self.num_vars();

        if self.a_eq.nrows() != self.num_equalities() || self.a_eq.ncols() != n {
            return Err(CovSteerError::SolverError(format!(
                "A_eq must be {}x{}, got {}x{}",
                self.num_equalities(),
                n,
                self.a_eq.nrows(),
                self.a_eq.ncols()
            )));
        }

        if self.a_ub.nrows() != self.num_inequalities() || self.a_ub.ncols() != n {
            return Err(CovSteerError::SolverError(format!(
                "A_ub must be {}x{}, got {}x{}",
                self.num_inequalities(),
                n,
                self.a_ub.nrows(),
                self.a_ub.ncols()
            )));
        }

        for (i, block) in self.psd_blocks.iter().enumerate() {
            let rows = svec_len(block.dim);
            if block.a.nrows() != rows || block.a.ncols() != n {
                return Err(CovSteerError::SolverError(format!(
                    "PSD block {} must be {}x{}, got {}x{}",
                    i,
                    rows,
                    n,
                    block.a.nrows(),
                    block.a.ncols()
                )));
            }
            if block.c.len() != rows {
                return Err(CovSteerError::SolverError(format!(
                    "PSD block {} constant length {} != {}",
                    i,
                    block.c.len(),
                    rows
                )));
            }
        }

        if self.var_meta.len() != n {
            return Err(CovSteerError::SolverError(format!(
                "var_meta length {} != num_vars {}",
                self.var_meta.len(),
                n
            )));
        }

        Ok(())
    }
}
