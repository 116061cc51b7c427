use covsteer_types::Result;
use serde::{Deserialize, Serialize};

use crate::cone_model::ConeModel;

/// SDP solver status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SdpStatus {
    Optimal,
    PrimalInfeasible,
    DualInfeasible,
    MaxIterations,
    Unsolved,
}

/// Solution from an SDP solver
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SdpSolution {
    pub x: Vec<f64>,
    pub status: SdpStatus,
    pub objective: f64,
    pub iterations: usize,
}

/// Trait for SDP solver backends
pub trait SolverBackend: Send + Sync {
    /// Solve a conic program: minimize q^T x subject to linear
    /// equalities, linear inequalities and PSD cone constraints
    fn solve(&self, model: &ConeModel) -> Result<SdpSolution>;
}
