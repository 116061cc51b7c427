use nalgebra::DMatrix;
use serde::{Deserialize, Serialize};

use crate::error::{CovSteerError, Result};

/// Discrete-time linear system x_{k+1} = A x_k + B u_k + w_k,
/// w_k ~ N(0, W), over a finite horizon.
#[derive(Debug, Clone)]
pub struct LinearSystem {
    /// State matrix A (n x n)
    pub a: DMatrix<f64>,
    /// Input matrix B (n x m)
    pub b: DMatrix<f64>,
    /// Process noise covariance W (n x n, symmetric PSD)
    pub w: DMatrix<f64>,
    /// Horizon length N (number of control steps)
    pub horizon: usize,
}

impl LinearSystem {
    pub fn new(a: DMatrix<f64>, b: DMatrix<f64>, w: DMatrix<f64>, horizon: usize) -> Self {
        LinearSystem { a, b, w, horizon }
    }

    /// State dimension n
    pub fn state_dim(&self) -> usize {
        self.a.nrows()
    }

    /// Input dimension m
    pub fn input_dim(&self) -> usize {
        self.b.ncols()
    }

    /// Check matrix shapes before any solve
    pub fn validate(&self) -> Result<()> {
        let n = self.state_dim();
        let m = self.input_dim();

        if self.a.ncols() != n {
            return Err(CovSteerError::Dimension(format!(
                "A must be square, got {}x{}",
                self.a.nrows(),
                self.a.ncols()
            )));
        }
        if self.b.nrows() != n {
            return Err(CovSteerError::Dimension(format!(
                "B must have {} rows to match A, got {}x{}",
                n,
                self.b.nrows(),
                m
            )));
        }
        if self.w.nrows() != n || self.w.ncols() != n {
            return Err(CovSteerError::Dimension(format!(
                "W must be {}x{}, got {}x{}",
                n,
                n,
                self.w.nrows(),
                self.w.ncols()
            )));
        }
        if !is_symmetric(&self.w, 1e-9) {
            return Err(CovSteerError::Dimension("W must be symmetric".to_string()));
        }
        if self.horizon == 0 {
            return Err(CovSteerError::Dimension(
                "horizon must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

/// Scalar upper bound on one entry of one intermediate state covariance:
/// Sigma_step[row, col] <= limit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathBound {
    pub step: usize,
    pub row: usize,
    pub col: usize,
    pub limit: f64,
}

/// Covariance steering problem: drive the state covariance from
/// `sigma_initial` to `sigma_terminal` over the system horizon while
/// minimizing total control energy.
#[derive(Debug, Clone)]
pub struct SteeringProblem {
    pub system: LinearSystem,
    /// Fixed initial covariance Sigma_0 (n x n, symmetric)
    pub sigma_initial: DMatrix<f64>,
    /// Fixed terminal covariance Sigma_N (n x n, symmetric)
    pub sigma_terminal: DMatrix<f64>,
    /// Optional bound on one entry of one intermediate covariance
    pub path_bound: Option<PathBound>,
}

impl SteeringProblem {
    pub fn new(
        system: LinearSystem,
        sigma_initial: DMatrix<f64>,
        sigma_terminal: DMatrix<f64>,
    ) -> Self {
        SteeringProblem {
            system,
            sigma_initial,
            sigma_terminal,
            path_bound: None,
        }
    }

    pub fn with_path_bound(mut self, bound: PathBound) -> Self {
        self.path_bound = Some(bound);
        self
    }

    pub fn validate(&self) -> Result<()> {
        self.system.validate()?;

        let n = self.system.state_dim();
        for (name, sigma) in [
            ("Sigma_0", &self.sigma_initial),
            ("Sigma_N", &self.sigma_terminal),
        ] {
            if sigma.nrows() != n || sigma.ncols() != n {
                return Err(CovSteerError::Dimension(format!(
                    "{} must be {}x{}, got {}x{}",
                    name,
                    n,
                    n,
                    sigma.nrows(),
                    sigma.ncols()
                )));
            }
            if !is_symmetric(sigma, 1e-9) {
                return Err(CovSteerError::Dimension(format!(
                    "{} must be symmetric",
                    name
                )));
            }
        }

        if let Some(bound) = &self.path_bound {
            if bound.step == 0 || bound.step >= self.system.horizon {
                return Err(CovSteerError::Dimension(format!(
                    "path bound step {} must be strictly inside horizon 1..{}",
                    bound.step, self.system.horizon
                )));
            }
            if bound.row >= n || bound.col >= n {
                return Err(CovSteerError::Dimension(format!(
                    "path bound entry ({}, {}) out of range for n = {}",
                    bound.row, bound.col, n
                )));
            }
        }

        Ok(())
    }
}

/// Symmetry check up to an absolute tolerance
pub fn is_symmetric(matrix: &DMatrix<f64>, tolerance: f64) -> bool {
    if matrix.nrows() != matrix.ncols() {
        return false;
    }
    for i in 0..matrix.nrows() {
        for j in (i + 1)..matrix.ncols() {
            if (matrix[(i, j)] - matrix[(j, i)]).abs() > tolerance {
                return false;
            }
        }
    }
    true
}
