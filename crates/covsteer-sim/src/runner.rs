use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use covsteer_solver::{ClarabelSolver, SolverBackend};
use covsteer_steering::{extract_gains, SdpBuilder, SteeringSolution, DEFAULT_COND_LIMIT};
use covsteer_types::{Result, SteeringProblem};

use crate::scenario::ScenarioConfig;
use crate::trajectory::{SimConfig, TrajectorySimulator};
use crate::Ellipse;

/// Pipeline-wide numerical settings, passed explicitly instead of
/// living in process-global state
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RunnerConfig {
    pub solver_max_iter: u32,
    pub solver_tolerance: f64,
    /// Condition limit for gain extraction
    pub cond_limit: f64,
    /// Diagonal regularization for sampling factorizations
    pub jitter: f64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        RunnerConfig {
            solver_max_iter: 10000,
            solver_tolerance: 1e-8,
            cond_limit: DEFAULT_COND_LIMIT,
            jitter: 1e-9,
        }
    }
}

/// Renderer-facing output of one scenario run: plain nested data, no
/// matrix types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioReport {
    pub label: String,
    /// Total control energy sum_k trace(M_k)
    pub objective: f64,
    pub solver_iterations: usize,
    /// Time step -> closed ellipse boundary; empty unless the state is
    /// planar
    pub ellipses: BTreeMap<usize, Vec<[f64; 2]>>,
    /// Sample path -> time step -> state coordinates
    pub trajectories: Vec<Vec<Vec<f64>>>,
}

/// Runs the full steering pipeline for one scenario:
/// build -> solve -> extract gains -> simulate -> ellipses.
///
/// A failure at any stage is terminal for that scenario and reported
/// verbatim; nothing is retried and no stage substitutes defaults.
pub struct ScenarioRunner {
    backend: Arc<dyn SolverBackend>,
    config: RunnerConfig,
}

impl ScenarioRunner {
    /// Runner with the Clarabel backend and default settings
    pub fn new() -> Self {
        Self::with_config(RunnerConfig::default())
    }

    pub fn with_config(config: RunnerConfig) -> Self {
        ScenarioRunner {
            backend: Arc::new(ClarabelSolver::with_params(
                config.solver_max_iter,
                config.solver_tolerance,
            )),
            config,
        }
    }

    /// Runner with a custom backend
    pub fn with_backend(backend: Arc<dyn SolverBackend>, config: RunnerConfig) -> Self {
        ScenarioRunner { backend, config }
    }

    /// Solve and simulate one scenario. The scenario's path bound, if
    /// any, replaces the one on the base problem, so variants share a
    /// single problem definition.
    pub fn run(&self, base: &SteeringProblem, scenario: &ScenarioConfig) -> Result<ScenarioReport> {
        let mut problem = base.clone();
        problem.path_bound = scenario.path_bound;

        info!(label = %scenario.label, horizon = problem.system.horizon, "running scenario");

        let model = SdpBuilder::build(&problem)?;
        let raw = self.backend.solve(&model)?;
        let solution = SteeringSolution::extract(&problem, &raw)?;
        info!(
            label = %scenario.label,
            objective = solution.objective,
            iterations = solution.iterations,
            "steering SDP solved"
        );

        let gains = extract_gains(&solution, self.config.cond_limit)?;

        let simulator = TrajectorySimulator::new(
            &problem.system,
            &problem.sigma_initial,
            gains,
            self.config.jitter,
        )?;
        let sim_config = SimConfig {
            sample_count: scenario.sample_count,
            seed: scenario.seed,
        };
        let trajectories = simulator.simulate(&sim_config)?;

        let mut ellipses = BTreeMap::new();
        if problem.system.state_dim() == 2 {
            for (step, sigma) in solution.sigma.iter().enumerate() {
                let ellipse = Ellipse::from_covariance(sigma, scenario.ellipse_scale)?;
                ellipses.insert(step, ellipse.points(scenario.ellipse_segments).collect());
            }
        }

        Ok(ScenarioReport {
            label: scenario.label.clone(),
            objective: solution.objective,
            solver_iterations: solution.iterations,
            ellipses,
            trajectories: trajectories
                .iter()
                .map(|path| path.iter().map(|x| x.as_slice().to_vec()).collect())
                .collect(),
        })
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}
