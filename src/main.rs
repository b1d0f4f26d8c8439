mod algorithm;
mod assignment;
mod common;
mod config;
mod map;
mod solver;
mod stat;
mod yaml;

use anyhow::{ensure, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use config::Cli;
use solver::{CbsTa, Solver};
use yaml::InputYaml;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    ensure!(cli.group_size > 0, "groupSize must be at least 1");

    let input = InputYaml::from_file(&cli.input)
        .with_context(|| format!("failed to load instance {:?}", cli.input))?;
    let (map, starts) = input.to_instance()?;

    let mut solver = CbsTa::new(map, starts, cli.max_task_assignments, cli.group_size);
    match solver.solve() {
        Some(solution) => {
            yaml::write_solution(&cli.output, &solution, solver.stats())
                .with_context(|| format!("failed to write schedule {:?}", cli.output))?;
            info!("planning successful");
        }
        None => {
            if solver.stats().budget_exhausted {
                warn!(
                    "planning failed: task assignment budget spent after {} draws",
                    solver.stats().num_task_assignments
                );
            } else {
                warn!("planning failed: no conflict-free assignment and routing");
            }
        }
    }

    Ok(())
}
