//! Runs both standard scenarios on the reference steering problem and
//! prints the renderer payload as JSON.

use nalgebra::DMatrix;

use covsteer_sim::{ScenarioConfig, ScenarioRunner};
use covsteer_types::{LinearSystem, PathBound, SteeringProblem};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let system = LinearSystem::new(
        DMatrix::from_row_slice(2, 2, &[1.0, 0.1, -0.3, 1.0]),
        DMatrix::from_row_slice(2, 1, &[0.7, 0.4]),
        DMatrix::identity(2, 2) * 0.1,
        10,
    );
    let problem = SteeringProblem::new(
        system,
        DMatrix::identity(2, 2) * 3.0,
        DMatrix::from_row_slice(2, 2, &[2.0, 0.0, 0.0, 0.5]),
    );

    let runner = ScenarioRunner::new();
    let scenarios = [
        ScenarioConfig::unconstrained(),
        ScenarioConfig::intermediate_bound(PathBound {
            step: 5,
            row: 0,
            col: 0,
            limit: 3.0,
        }),
    ];

    for scenario in &scenarios {
        match runner.run(&problem, scenario) {
            Ok(report) => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).expect("report serializes")
                );
            }
            Err(err) => {
                eprintln!("scenario {} failed: {err}", scenario.label);
                std::process::exit(1);
            }
        }
    }
}
