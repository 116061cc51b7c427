use thiserror::Error;

#[derive(Debug, Error)]
pub enum CovSteerError {
    #[error("Dimension mismatch: {0}")]
    Dimension(String),

    #[error("Infeasible problem: {0}")]
    Infeasible(String),

    #[error("Solver error: {0}")]
    SolverError(String),

    #[error("Gain extraction failed at step {step}: {reason}")]
    GainExtraction { step: usize, reason: String },

    #[error("Simulation error: {0}")]
    Simulation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CovSteerError>;
