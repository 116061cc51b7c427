mod backend;
mod clarabel_backend;
mod cone_model;

pub use backend::{SdpSolution, SdpStatus, SolverBackend};
pub use clarabel_backend::ClarabelSolver;
pub use cone_model::{svec_len, ConeModel, PsdBlock, VarMeta};

#[cfg(test)]
mod tests;
