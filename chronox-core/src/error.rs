use thiserror::Error;

use crate::TimerState;

/// User-facing stopwatch operations, for error reporting.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Operation {
    Start,
    Stop,
    Reset,
    Lap,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Error)]
pub enum StopwatchError {
    #[error("stopwatch is already running")]
    AlreadyRunning,
    #[error("stopwatch is not running")]
    NotRunning,
    #[error("cannot {op:?} while {state:?}")]
    InvalidState { op: Operation, state: TimerState },
}

impl StopwatchError {
    /// Redundant start/stop requests; safe to drop without feedback.
    pub fn is_redundant(&self) -> bool {
        matches!(self, Self::AlreadyRunning | Self::NotRunning)
    }
}
