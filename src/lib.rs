//! Game of Life and Problife simulation engine
//!
//! Evolves a two-dimensional cellular automaton under either classic
//! threshold rules or Problife, where births and survivals happen with
//! configured probabilities. Generations are immutable snapshots stepped by a
//! play/step/stop/reset state machine.

pub mod config;
pub mod engine;
pub mod error;
pub mod life;
pub mod utils;

pub use config::Settings;
pub use engine::{create_simulation, RunState, Simulation};
pub use error::EngineError;
pub use life::{CellState, Grid, RuleSet};

use anyhow::Result;

/// Build the configured simulation and drive it to a soft stop
pub fn run_simulation(settings: &Settings) -> Result<engine::RunReport> {
    let mut sim = settings.build_simulation()?;
    let runner = engine::Runner::new(settings.stop_policy())?;
    Ok(runner.run(&mut sim)?)
}
