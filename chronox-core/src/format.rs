use std::fmt;

const MS_PER_SECOND: u64 = 1000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

/// Two-part display text: the main clock and its hundredths suffix.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct TimeText {
    /// "HH:MM:SS", hours wrap at 24
    pub clock: String,
    /// ".CC"
    pub fraction: String,
}

impl fmt::Display for TimeText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.clock, self.fraction)
    }
}

struct Parts {
    h: u64,
    m: u64,
    s: u64,
    cs: u64,
}

fn split(ms: u64) -> Parts {
    Parts {
        h: (ms / MS_PER_HOUR) % 24,
        m: (ms / MS_PER_MINUTE) % 60,
        s: (ms / MS_PER_SECOND) % 60,
        cs: (ms % MS_PER_SECOND) / 10,
    }
}

/// Format milliseconds as "HH:MM:SS" plus ".CC" (centiseconds)
pub fn format_elapsed(ms: u64) -> TimeText {
    let p = split(ms);
    TimeText {
        clock: format!("{:02}:{:02}:{:02}", p.h, p.m, p.s),
        fraction: format!(".{:02}", p.cs),
    }
}

/// Format milliseconds as "HH:MM:SS.CC" (single string, used for laps)
pub fn format_lap(ms: u64) -> String {
    let p = split(ms);
    format!("{:02}:{:02}:{:02}.{:02}", p.h, p.m, p.s, p.cs)
}
