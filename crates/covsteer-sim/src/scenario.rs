use serde::{Deserialize, Serialize};

use covsteer_types::PathBound;

/// Scenario configuration.
///
/// The two standard variants differ only in whether the intermediate
/// path bound is present; everything else is rendering and sampling
/// detail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    pub label: String,
    /// Optional bound on one entry of one intermediate covariance
    pub path_bound: Option<PathBound>,
    /// Number of Monte-Carlo sample paths
    pub sample_count: usize,
    /// Base random seed for reproducibility
    pub seed: u64,
    /// Ellipse radius multiplier (1 = one standard deviation)
    pub ellipse_scale: f64,
    /// Boundary points per ellipse (excluding the closing point)
    pub ellipse_segments: usize,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            label: "unconstrained".to_string(),
            path_bound: None,
            sample_count: 100,
            seed: 42,
            ellipse_scale: 1.0,
            ellipse_segments: 100,
        }
    }
}

impl ScenarioConfig {
    /// Baseline variant: steer between the boundary covariances with no
    /// intermediate constraint
    pub fn unconstrained() -> Self {
        ScenarioConfig::default()
    }

    /// Variant with a scalar cap on one intermediate covariance entry
    pub fn intermediate_bound(bound: PathBound) -> Self {
        ScenarioConfig {
            label: "intermediate-bound".to_string(),
            path_bound: Some(bound),
            ..Default::default()
        }
    }
}
