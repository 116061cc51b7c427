use nalgebra::DMatrix;
use tracing::warn;

use covsteer_types::{CovSteerError, Result};

use crate::solution::SteeringSolution;

/// Condition number above which Sigma_k is treated as numerically
/// singular during gain extraction
pub const DEFAULT_COND_LIMIT: f64 = 1e12;

/// Recover the feedback gains K_k = (Sigma_k^-1 P_k)^T from a solved
/// steering problem.
///
/// Each Sigma_k is inverted through its symmetric eigendecomposition.
/// A step whose covariance is indefinite or conditioned worse than
/// `cond_limit` fails with a `GainExtraction` error instead of letting
/// NaNs flow into the simulation.
pub fn extract_gains(solution: &SteeringSolution, cond_limit: f64) -> Result<Vec<DMatrix<f64>>> {
    let mut gains = Vec::with_capacity(solution.horizon());

    for k in 0..solution.horizon() {
        let sigma = &solution.sigma[k];
        let eigen = sigma.clone().symmetric_eigen();

        let lambda_min = eigen.eigenvalues.min();
        let lambda_max = eigen.eigenvalues.max();

        if lambda_min <= 0.0 {
            return Err(CovSteerError::GainExtraction {
                step: k,
                reason: format!("covariance not positive definite (lambda_min = {lambda_min:e})"),
            });
        }
        let cond = lambda_max / lambda_min;
        if cond > cond_limit {
            warn!(step = k, cond, "covariance near singular");
            return Err(CovSteerError::GainExtraction {
                step: k,
                reason: format!("condition number {cond:e} exceeds limit {cond_limit:e}"),
            });
        }

        // Sigma^-1 = V diag(1/lambda) V^T
        let inv_lambda = eigen.eigenvalues.map(|l| 1.0 / l);
        let sigma_inv =
            &eigen.eigenvectors * DMatrix::from_diagonal(&inv_lambda) * eigen.eigenvectors.transpose();

        // K = (Sigma^-1 P)^T = P^T Sigma^-1 by symmetry of Sigma
        gains.push(solution.cross[k].transpose() * sigma_inv);
    }

    Ok(gains)
}
