//! Collaborators the engine consumes: a wall clock and a repeating scheduler.

use std::time::{SystemTime, UNIX_EPOCH};

/// Source of wall-clock time in epoch milliseconds.
pub trait Clock {
    fn now_ms(&self) -> u64;
}

/// Epoch milliseconds from the system clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        // A clock set before 1970 reads as zero; the engine clamps anyway
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// Identifies one repeating schedule. Ticks carry the token they were
/// scheduled under so stale ones can be told apart from live ones.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct TickToken(pub u64);

/// Repeating-callback facility driving `StopwatchEngine::tick`.
///
/// Implementations deliver ticks to the thread that owns the engine, at most
/// one outstanding at a time.
pub trait Scheduler {
    /// Begin delivering ticks every `period_ms` until cancelled.
    fn schedule_repeating(&mut self, period_ms: u64) -> TickToken;

    /// Stop delivering ticks for `token`. Unknown or stale tokens are ignored.
    fn cancel(&mut self, token: TickToken);
}

impl<S: Scheduler + ?Sized> Scheduler for Box<S> {
    fn schedule_repeating(&mut self, period_ms: u64) -> TickToken {
        (**self).schedule_repeating(period_ms)
    }

    fn cancel(&mut self, token: TickToken) {
        (**self).cancel(token)
    }
}
