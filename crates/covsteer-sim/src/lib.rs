mod ellipse;
mod runner;
mod scenario;
mod trajectory;

pub use ellipse::{Ellipse, EllipsePoints};
pub use runner::{RunnerConfig, ScenarioReport, ScenarioRunner};
pub use scenario::ScenarioConfig;
pub use trajectory::{empirical_mean, terminal_covariance, SimConfig, TrajectorySimulator};
