//! Simulation engine: stepping state machine and run drivers

pub mod ensemble;
pub mod runner;
pub mod simulation;

pub use ensemble::{run_ensemble, EnsembleReport};
pub use runner::{RunReport, Runner, StopPolicy, StopReason};
pub use simulation::{create_simulation, RunState, Simulation, SimulationParams};
