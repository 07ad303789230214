use std::io::{self, Write};

use chronox_core::{format_lap, Controls, Lap, TimeText};

const BELL: &str = "\x07";
const CLEAR_LINE: &str = "\r\x1b[2K";

pub const HELP_TEXT: &str = "STOPWATCH HELP\n\n\
     Enter  Start/Stop\n\
     s      Start/Stop\n\
     x      Stop\n\
     l, spc Record lap (running)\n\
     r      Reset (stopped)\n\
     h      Help\n\
     q      Quit";

/// Running indicator next to the clock; alternates once per second.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Pulse {
    Idle,
    Bright,
    Dim,
}

impl Pulse {
    fn glyph(self) -> char {
        match self {
            Pulse::Idle => ' ',
            Pulse::Bright => '●',
            Pulse::Dim => '○',
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Pulse::Idle => Pulse::Idle,
            Pulse::Bright => Pulse::Dim,
            Pulse::Dim => Pulse::Bright,
        }
    }
}

pub fn draw_title(out: &mut impl Write, app_name: &str) -> io::Result<()> {
    writeln!(out, "{}  (h = help)", app_name.to_uppercase())
}

pub fn draw_clock(out: &mut impl Write, display: &TimeText, pulse: Pulse) -> io::Result<()> {
    write!(out, "{}{} {}{}", CLEAR_LINE, pulse.glyph(), display.clock, display.fraction)?;
    out.flush()
}

pub fn draw_lap(out: &mut impl Write, lap: &Lap, show_split: bool) -> io::Result<()> {
    write!(out, "{}Lap {:2}: {}", CLEAR_LINE, lap.index, lap.text)?;
    if show_split {
        write!(out, "  (+{})", format_lap(lap.split_ms))?;
    }
    writeln!(out)
}

/// Every lap recorded so far, oldest first.
pub fn draw_laps(out: &mut impl Write, laps: &[u64], show_split: bool) -> io::Result<()> {
    let mut previous = 0;
    for (i, &elapsed_ms) in laps.iter().enumerate() {
        let lap = Lap {
            index: i + 1,
            elapsed_ms,
            split_ms: elapsed_ms.saturating_sub(previous),
            text: format_lap(elapsed_ms),
        };
        draw_lap(out, &lap, show_split)?;
        previous = elapsed_ms;
    }
    Ok(())
}

pub fn draw_controls(out: &mut impl Write, controls: Controls) -> io::Result<()> {
    let mut keys = Vec::new();
    if controls.start {
        keys.push("Enter=start");
    }
    if controls.stop {
        keys.push("Enter=stop");
    }
    if controls.lap {
        keys.push("l=lap");
    }
    if controls.reset {
        keys.push("r=reset");
    }
    keys.push("q=quit");
    writeln!(out, "{}[{}]", CLEAR_LINE, keys.join("  "))
}

/// Feedback for a rejected action (the lap button shake, in terminal form).
pub fn draw_rejected(out: &mut impl Write, message: &str, bell: bool) -> io::Result<()> {
    if bell {
        write!(out, "{}", BELL)?;
    }
    writeln!(out, "{}! {}", CLEAR_LINE, message)
}

pub fn draw_help(out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "{}{}", CLEAR_LINE, HELP_TEXT)?;
    writeln!(out, "\nPress any key to close")
}
