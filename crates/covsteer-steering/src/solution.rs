use nalgebra::DMatrix;

use covsteer_solver::{SdpSolution, SdpStatus};
use covsteer_types::{CovSteerError, LinearSystem, Result, SteeringProblem};

use crate::layout::VarLayout;

/// Solved covariance steering sequences, reconstructed from the flat
/// solver vector.
#[derive(Debug, Clone)]
pub struct SteeringSolution {
    /// Sigma_0..Sigma_N, each n x n symmetric
    pub sigma: Vec<DMatrix<f64>>,
    /// P_0..P_{N-1}, each n x m
    pub cross: Vec<DMatrix<f64>>,
    /// M_0..M_{N-1}, each m x m symmetric
    pub input_moment: Vec<DMatrix<f64>>,
    /// Total control energy sum_k trace(M_k)
    pub objective: f64,
    pub iterations: usize,
}

impl SteeringSolution {
    /// Map the raw solver result into steering sequences.
    ///
    /// Non-optimal statuses become terminal errors: primal
    /// infeasibility means the boundary covariances cannot be connected
    /// under the given dynamics, everything else is a solver failure.
    /// Neither is retried.
    pub fn extract(problem: &SteeringProblem, raw: &SdpSolution) -> Result<Self> {
        match raw.status {
            SdpStatus::Optimal => {}
            SdpStatus::PrimalInfeasible => {
                return Err(CovSteerError::Infeasible(
                    "no covariance path connects the boundary values".to_string(),
                ))
            }
            SdpStatus::DualInfeasible => {
                return Err(CovSteerError::SolverError(
                    "dual infeasible: objective unbounded below".to_string(),
                ))
            }
            SdpStatus::MaxIterations => {
                return Err(CovSteerError::SolverError(
                    "iteration limit reached before convergence".to_string(),
                ))
            }
            SdpStatus::Unsolved => {
                return Err(CovSteerError::SolverError(
                    "solver returned no solution".to_string(),
                ))
            }
        }

        let sys = &problem.system;
        let n = sys.state_dim();
        let m = sys.input_dim();
        let horizon = sys.horizon;
        let layout = VarLayout::new(n, m, horizon);

        if raw.x.len() != layout.num_vars() {
            return Err(CovSteerError::Internal(format!(
                "solution length {} != {} variables",
                raw.x.len(),
                layout.num_vars()
            )));
        }

        let sigma = (0..=horizon)
            .map(|k| {
                DMatrix::from_fn(n, n, |r, c| raw.x[layout.sigma(k, r, c)])
            })
            .collect();
        let cross = (0..horizon)
            .map(|k| {
                DMatrix::from_fn(n, m, |r, c| raw.x[layout.cross(k, r, c)])
            })
            .collect();
        let input_moment = (0..horizon)
            .map(|k| {
                DMatrix::from_fn(m, m, |r, c| raw.x[layout.input_moment(k, r, c)])
            })
            .collect();

        Ok(SteeringSolution {
            sigma,
            cross,
            input_moment,
            objective: raw.objective,
            iterations: raw.iterations,
        })
    }

    /// Horizon length N
    pub fn horizon(&self) -> usize {
        self.cross.len()
    }

    /// Assemble the joint block [[Sigma_k, P_k], [P_k^T, M_k]] for
    /// feasibility diagnostics
    pub fn lmi_block(&self, k: usize) -> DMatrix<f64> {
        let n = self.sigma[k].nrows();
        let m = self.input_moment[k].nrows();
        let mut block = DMatrix::zeros(n + m, n + m);
        block.view_mut((0, 0), (n, n)).copy_from(&self.sigma[k]);
        block.view_mut((0, n), (n, m)).copy_from(&self.cross[k]);
        block
            .view_mut((n, 0), (m, n))
            .copy_from(&self.cross[k].transpose());
        block
            .view_mut((n, n), (m, m))
            .copy_from(&self.input_moment[k]);
        block
    }

    /// Residual of the second-moment recursion at step k:
    /// Sigma_{k+1} - (A Sigma_k A^T + A P_k B^T + B P_k^T A^T
    ///               + B M_k B^T + W)
    pub fn recursion_residual(&self, sys: &LinearSystem, k: usize) -> DMatrix<f64> {
        let propagated = &sys.a * &self.sigma[k] * sys.a.transpose()
            + &sys.a * &self.cross[k] * sys.b.transpose()
            + &sys.b * self.cross[k].transpose() * sys.a.transpose()
            + &sys.b * &self.input_moment[k] * sys.b.transpose()
            + &sys.w;
        &self.sigma[k + 1] - propagated
    }
}
