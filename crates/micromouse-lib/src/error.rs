use thiserror::Error;

use crate::grid::Coord;
use crate::motion::Command;

/// Convenient result alias for the micromouse library.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// An offset that is not one of the eight compass vectors reached direction arithmetic.
    #[error("offset ({dx}, {dy}) is not a compass direction")]
    InvalidDirection { dx: i32, dy: i32 },

    /// A coordinate outside the grid extents was used.
    #[error("cell ({x}, {y}) is outside the {width}x{height} maze")]
    OutOfBounds {
        x: i32,
        y: i32,
        width: usize,
        height: usize,
    },

    /// The search exhausted every reachable cell without touching a goal.
    #[error("no path found from {start} to any of {} goal cell(s)", goals.len())]
    NoPathFound { start: Coord, goals: Vec<Coord> },

    /// The peripheral refused a motion the map considered legal.
    #[error("peripheral rejected {command}")]
    MotionRejected { command: Command },

    /// The peripheral did not answer in time.
    #[error("peripheral did not answer `{request}` within {millis}ms")]
    PeripheralTimeout { request: String, millis: u64 },

    /// The peripheral answered with something outside its contract.
    #[error("peripheral protocol error: {message}")]
    Peripheral { message: String },

    /// A planned edge is not traversable under the current wall model.
    #[error("cannot move from {from} to {to}")]
    IllegalMove { from: Coord, to: Coord },

    /// Maze dimensions, layout text or configuration are unusable.
    #[error("invalid maze: {message}")]
    InvalidMaze { message: String },

    /// Wrapper for IO errors.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    pub(crate) fn invalid_maze(message: impl Into<String>) -> Self {
        Self::InvalidMaze {
            message: message.into(),
        }
    }

    /// `true` for failures that only abort the current phase.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::NoPathFound { .. } | Error::MotionRejected { .. })
    }
}
