use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use covsteer_types::{CovSteerError, LinearSystem, Result};

/// Monte-Carlo settings
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SimConfig {
    pub sample_count: usize,
    /// Base seed; sample i uses stream seed + i
    pub seed: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            sample_count: 100,
            seed: 42,
        }
    }
}

/// Closed-loop Monte-Carlo rollout of x_{k+1} = A x_k + B u_k + w_k
/// with u_k = K_k x_k.
///
/// Samples never share mutable state: each one gets its own
/// stream-isolated rng, so the set is reproducible for a fixed base
/// seed and independent across samples.
pub struct TrajectorySimulator {
    a: DMatrix<f64>,
    b: DMatrix<f64>,
    /// Cholesky factor of Sigma_0
    initial_factor: DMatrix<f64>,
    /// Cholesky factor of W
    noise_factor: DMatrix<f64>,
    gains: Vec<DMatrix<f64>>,
}

impl TrajectorySimulator {
    pub fn new(
        system: &LinearSystem,
        sigma_initial: &DMatrix<f64>,
        gains: Vec<DMatrix<f64>>,
        jitter: f64,
    ) -> Result<Self> {
        let n = system.state_dim();
        let m = system.input_dim();

        if gains.len() != system.horizon {
            return Err(CovSteerError::Dimension(format!(
                "expected {} gains, got {}",
                system.horizon,
                gains.len()
            )));
        }
        for (k, gain) in gains.iter().enumerate() {
            if gain.nrows() != m || gain.ncols() != n {
                return Err(CovSteerError::Dimension(format!(
                    "gain {} must be {}x{}, got {}x{}",
                    k,
                    m,
                    n,
                    gain.nrows(),
                    gain.ncols()
                )));
            }
        }

        Ok(TrajectorySimulator {
            a: system.a.clone(),
            b: system.b.clone(),
            initial_factor: cholesky_factor(sigma_initial, jitter, "Sigma_0")?,
            noise_factor: cholesky_factor(&system.w, jitter, "W")?,
            gains,
        })
    }

    /// Roll out `config.sample_count` independent trajectories, each a
    /// sequence of N+1 states starting from x_0 ~ N(0, Sigma_0)
    pub fn simulate(&self, config: &SimConfig) -> Result<Vec<Vec<DVector<f64>>>> {
        (0..config.sample_count)
            .map(|i| self.simulate_one(config.seed.wrapping_add(i as u64)))
            .collect()
    }

    fn simulate_one(&self, seed: u64) -> Result<Vec<DVector<f64>>> {
        let mut rng = StdRng::seed_from_u64(seed);
        let n = self.a.nrows();

        let mut trajectory = Vec::with_capacity(self.gains.len() + 1);
        let mut state = &self.initial_factor * standard_normal(&mut rng, n);
        trajectory.push(state.clone());

        for gain in &self.gains {
            let control = gain * &state;
            let noise = &self.noise_factor * standard_normal(&mut rng, n);
            state = &self.a * &state + &self.b * control + noise;
            trajectory.push(state.clone());
        }

        Ok(trajectory)
    }
}

fn standard_normal(rng: &mut StdRng, n: usize) -> DVector<f64> {
    DVector::from_fn(n, |_, _| rng.sample(StandardNormal))
}

/// Lower Cholesky factor, retrying once with diagonal jitter for
/// covariances that are PSD only up to rounding
fn cholesky_factor(matrix: &DMatrix<f64>, jitter: f64, name: &str) -> Result<DMatrix<f64>> {
    if let Some(chol) = matrix.clone().cholesky() {
        return Ok(chol.l());
    }
    let padded = matrix + DMatrix::identity(matrix.nrows(), matrix.ncols()) * jitter;
    padded
        .cholesky()
        .map(|chol| chol.l())
        .ok_or_else(|| CovSteerError::Simulation(format!("{name} is not positive semidefinite")))
}

/// Mean of the final state across trajectories; fails on an empty set
pub fn empirical_mean(trajectories: &[Vec<DVector<f64>>]) -> Result<DVector<f64>> {
    let mut terminals = Vec::with_capacity(trajectories.len());
    for trajectory in trajectories {
        terminals.push(trajectory.last().ok_or_else(|| {
            CovSteerError::Simulation("trajectory has no states".to_string())
        })?);
    }
    let first = terminals
        .first()
        .ok_or_else(|| CovSteerError::Simulation("no trajectories to average".to_string()))?;

    let mut mean = DVector::zeros(first.len());
    for terminal in &terminals {
        mean += *terminal;
    }
    Ok(mean / terminals.len() as f64)
}

/// Sample covariance of the final state across trajectories; needs at
/// least two samples for the unbiased divisor
pub fn terminal_covariance(trajectories: &[Vec<DVector<f64>>]) -> Result<DMatrix<f64>> {
    if trajectories.len() < 2 {
        return Err(CovSteerError::Simulation(format!(
            "sample covariance needs at least 2 trajectories, got {}",
            trajectories.len()
        )));
    }
    let mean = empirical_mean(trajectories)?;

    let mut cov = DMatrix::zeros(mean.len(), mean.len());
    for trajectory in trajectories {
        // Nonempty: empirical_mean already rejected empty trajectories
        if let Some(terminal) = trajectory.last() {
            let centered = terminal - &mean;
            cov += &centered * centered.transpose();
        }
    }
    Ok(cov / (trajectories.len() as f64 - 1.0))
}
