//! Error types for building grid worlds and run configurations.

use thiserror::Error;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("action '{name}' has direction ({d_row}, {d_col}); expected an axis aligned unit step")]
    InvalidDirection { name: String, d_row: i32, d_col: i32 },

    #[error("grid has no cells")]
    EmptyGrid,

    #[error("grid row {row} has {got} cells, expected {expected}")]
    RaggedGrid {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("terminal cell ({row}, {col}) is outside the grid")]
    TerminalOutOfBounds { row: usize, col: usize },

    #[error("model has no actions")]
    NoActions,

    #[error("slip model (intended {intended}, lateral {lateral}) is not a probability distribution")]
    InvalidSlip { intended: f64, lateral: f64 },

    #[error("discount factor {gamma} must be in (0, 1)")]
    InvalidDiscount { gamma: f64 },

    #[error("convergence threshold {epsilon} must be finite and positive")]
    InvalidThreshold { epsilon: f64 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
