//! Error types for the simulation engine

use crate::engine::RunState;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Malformed construction input; nothing was built.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Coordinates ({x}, {y}) out of bounds for {width}x{height} grid")]
    OutOfBounds {
        x: usize,
        y: usize,
        width: usize,
        height: usize,
    },

    /// The control action is not allowed in the current run state.
    /// The simulation is left untouched.
    #[error("Cannot {action} while {from}")]
    InvalidTransition { from: RunState, action: &'static str },
}

impl EngineError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        EngineError::InvalidParameter(msg.into())
    }
}
