mod error;
mod system;

pub use error::{CovSteerError, Result};
pub use system::{is_symmetric, LinearSystem, PathBound, SteeringProblem};
