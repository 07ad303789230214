//! Pure stopwatch logic with no platform dependencies.
//! Testable on host; the screen supplies the clock and the tick scheduler.

mod error;
mod event;
mod format;
mod schedule;

pub use error::{Operation, StopwatchError};
pub use event::{Controls, Event, Lap};
pub use format::{format_elapsed, format_lap, TimeText};
pub use schedule::{Clock, Scheduler, SystemClock, TickToken};

/// Display refresh period while running.
pub const TICK_PERIOD_MS: u64 = 10;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum TimerState {
    Idle,
    Running,
}

/// Stopwatch state machine.
///
/// `stop()` pauses: elapsed time is kept and the next `start()` continues
/// from it. Only `reset()` zeroes the accumulator. Calls that the current
/// state forbids return an error and leave the engine untouched.
pub struct StopwatchEngine<C: Clock, S: Scheduler> {
    clock: C,
    scheduler: S,
    state: TimerState,
    elapsed_ms: u64,
    // Elapsed at the last Idle -> Running transition
    banked_ms: u64,
    // Clock reading at the last Idle -> Running transition; Some only while Running
    segment_start_ms: Option<u64>,
    laps: Vec<u64>,
    // Live schedule; Some only while Running
    tick_token: Option<TickToken>,
}

impl<C: Clock, S: Scheduler> StopwatchEngine<C, S> {
    pub fn new(clock: C, scheduler: S) -> Self {
        Self {
            clock,
            scheduler,
            state: TimerState::Idle,
            elapsed_ms: 0,
            banked_ms: 0,
            segment_start_ms: None,
            laps: Vec::new(),
            tick_token: None,
        }
    }

    pub fn start(&mut self) -> Result<Event, StopwatchError> {
        if self.state == TimerState::Running {
            log::debug!("start ignored: already running");
            return Err(StopwatchError::AlreadyRunning);
        }
        // Run start is effectively now - elapsed, so time continues
        self.banked_ms = self.elapsed_ms;
        self.segment_start_ms = Some(self.clock.now_ms());
        self.state = TimerState::Running;
        let token = self.scheduler.schedule_repeating(TICK_PERIOD_MS);
        self.tick_token = Some(token);
        log::debug!("started at {} ms elapsed, {:?}", self.elapsed_ms, token);
        Ok(Event::Started { display: self.display() })
    }

    pub fn stop(&mut self) -> Result<Event, StopwatchError> {
        if self.state != TimerState::Running {
            log::debug!("stop ignored: not running");
            return Err(StopwatchError::NotRunning);
        }
        self.halt();
        log::debug!("stopped at {} ms elapsed", self.elapsed_ms);
        Ok(Event::Stopped { display: self.display() })
    }

    pub fn reset(&mut self) -> Result<Event, StopwatchError> {
        if self.state == TimerState::Running {
            log::debug!("reset rejected while running");
            return Err(StopwatchError::InvalidState {
                op: Operation::Reset,
                state: self.state,
            });
        }
        self.elapsed_ms = 0;
        self.banked_ms = 0;
        self.laps.clear();
        log::debug!("reset");
        Ok(Event::Reset { display: self.display() })
    }

    /// Refresh elapsed time from the clock.
    ///
    /// Returns `None` without touching anything unless the engine is running
    /// under `token`. A tick queued before `stop()` returned is rejected here
    /// even if the scheduler already delivered it.
    pub fn tick(&mut self, token: TickToken) -> Option<Event> {
        if self.state != TimerState::Running || self.tick_token != Some(token) {
            log::trace!("stale tick {:?} dropped", token);
            return None;
        }
        let segment_start = self.segment_start_ms?;
        let now = self.clock.now_ms();
        let previous = self.elapsed_ms;
        // Clock regressions clamp: never negative, never decreasing
        let elapsed = self
            .banked_ms
            .saturating_add(now.saturating_sub(segment_start));
        self.elapsed_ms = elapsed.max(previous);
        Some(Event::Tick {
            display: self.display(),
            clock_changed: whole_seconds(previous) != whole_seconds(self.elapsed_ms),
        })
    }

    /// Snapshot the elapsed time as of the last tick.
    pub fn record_lap(&mut self) -> Result<Lap, StopwatchError> {
        if self.state != TimerState::Running {
            log::debug!("lap rejected while idle");
            return Err(StopwatchError::InvalidState {
                op: Operation::Lap,
                state: self.state,
            });
        }
        let previous = self.laps.last().copied().unwrap_or(0);
        self.laps.push(self.elapsed_ms);
        let lap = Lap {
            index: self.laps.len(),
            elapsed_ms: self.elapsed_ms,
            split_ms: self.elapsed_ms.saturating_sub(previous),
            text: format_lap(self.elapsed_ms),
        };
        log::debug!("lap {} at {}", lap.index, lap.text);
        Ok(lap)
    }

    /// Cancel any live schedule and go idle, keeping elapsed time.
    pub fn shutdown(&mut self) {
        if self.state == TimerState::Running {
            self.halt();
            log::debug!("shut down while running");
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed_ms
    }

    pub fn laps(&self) -> &[u64] {
        &self.laps
    }

    pub fn display(&self) -> TimeText {
        format_elapsed(self.elapsed_ms)
    }

    pub fn controls(&self) -> Controls {
        let idle = self.state == TimerState::Idle;
        Controls {
            start: idle,
            stop: !idle,
            // Nothing to clear after a reset
            reset: idle && (self.elapsed_ms > 0 || !self.laps.is_empty()),
            lap: !idle,
        }
    }

    // State flag first, then the schedule
    fn halt(&mut self) {
        self.state = TimerState::Idle;
        if let Some(token) = self.tick_token.take() {
            self.scheduler.cancel(token);
        }
        self.segment_start_ms = None;
    }
}

impl<C: Clock, S: Scheduler> Drop for StopwatchEngine<C, S> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn whole_seconds(ms: u64) -> u64 {
    (ms / 1000) % 86_400
}
