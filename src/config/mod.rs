//! Configuration management for simulation runs

pub mod settings;

pub use settings::{
    BoundaryCondition, CliOverrides, InputConfig, OutputConfig, OutputFormat, RuleVariant,
    RulesConfig, Settings, SimulationConfig,
};
