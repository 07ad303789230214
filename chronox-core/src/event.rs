use crate::format::TimeText;

/// What the presentation layer gets back from the engine.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Event {
    Started { display: TimeText },
    Stopped { display: TimeText },
    Reset { display: TimeText },
    /// `clock_changed` is false when only the hundredths moved
    Tick { display: TimeText, clock_changed: bool },
    Lap(Lap),
}

impl Event {
    pub fn display(&self) -> Option<&TimeText> {
        match self {
            Event::Started { display }
            | Event::Stopped { display }
            | Event::Reset { display }
            | Event::Tick { display, .. } => Some(display),
            Event::Lap(_) => None,
        }
    }
}

/// One recorded lap marker.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Lap {
    /// 1-based, in recording order
    pub index: usize,
    /// Elapsed time at the moment of recording
    pub elapsed_ms: u64,
    /// Time since the previous lap (or since zero for the first)
    pub split_ms: u64,
    /// "HH:MM:SS.CC"
    pub text: String,
}

/// Which controls are currently accepted.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Controls {
    pub start: bool,
    pub stop: bool,
    pub reset: bool,
    pub lap: bool,
}
