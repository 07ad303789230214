mod bus;
mod config;
mod pump;
mod ui;

use std::io::{self, BufRead, Write};
use std::thread;

use chronox_core::{
    Clock, Event, Operation, Scheduler, StopwatchEngine, StopwatchError, SystemClock, TickToken,
};
use crossbeam::channel::{self, Sender};
use num_traits::FromPrimitive;

use crate::bus::{AppOp, Message};
use crate::config::{ScreenConfig, DEFAULT_LOG_FILTER};
use crate::ui::Pulse;

const APP_NAME: &str = "Chronox";

const KEY_ENTER: char = '\r';

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Action {
    Toggle,
    Stop,
    Reset,
    Lap,
    Help,
    Quit,
}

fn key_action(key: char) -> Option<Action> {
    match key {
        KEY_ENTER | '\n' | 's' => Some(Action::Toggle),
        'x' => Some(Action::Stop),
        'r' => Some(Action::Reset),
        'l' | ' ' => Some(Action::Lap),
        'h' | '?' => Some(Action::Help),
        'q' => Some(Action::Quit),
        _ => None,
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Flow {
    Continue,
    Quit,
}

/// The stopwatch screen: owns the engine for the whole session and renders
/// what it reports.
struct StopwatchScreen<C: Clock, S: Scheduler, W: Write> {
    engine: StopwatchEngine<C, S>,
    config: ScreenConfig,
    out: W,
    pulse: Pulse,
    help_visible: bool,
}

impl<C: Clock, S: Scheduler, W: Write> StopwatchScreen<C, S, W> {
    fn new(clock: C, scheduler: S, out: W, config: ScreenConfig) -> Self {
        Self {
            engine: StopwatchEngine::new(clock, scheduler),
            config,
            out,
            pulse: Pulse::Idle,
            help_visible: false,
        }
    }

    fn redraw(&mut self) {
        let result = if self.help_visible {
            ui::draw_help(&mut self.out)
        } else {
            ui::draw_title(&mut self.out, APP_NAME)
                .and_then(|_| ui::draw_controls(&mut self.out, self.engine.controls()))
                .and_then(|_| {
                    ui::draw_laps(&mut self.out, self.engine.laps(), self.config.show_splits)
                })
                .and_then(|_| ui::draw_clock(&mut self.out, &self.engine.display(), self.pulse))
        };
        self.check(result);
    }

    fn handle_key(&mut self, key: char) -> Flow {
        // Help screen: any key dismisses it
        if self.help_visible {
            self.help_visible = false;
            self.redraw();
            return Flow::Continue;
        }

        match key_action(key) {
            Some(Action::Toggle) => {
                let result = if self.engine.is_running() {
                    self.engine.stop()
                } else {
                    self.engine.start()
                };
                self.apply(result);
            }
            Some(Action::Stop) => {
                let result = self.engine.stop();
                self.apply(result);
            }
            Some(Action::Reset) => {
                let result = self.engine.reset();
                self.apply(result);
            }
            Some(Action::Lap) => {
                let result = self.engine.record_lap().map(Event::Lap);
                self.apply(result);
            }
            Some(Action::Help) => {
                self.help_visible = true;
                self.redraw();
            }
            Some(Action::Quit) => return Flow::Quit,
            None => log::trace!("unbound key {:?}", key),
        }
        Flow::Continue
    }

    fn handle_pump(&mut self, token: TickToken) {
        if let Some(event) = self.engine.tick(token) {
            self.render(event);
        }
    }

    fn apply(&mut self, result: Result<Event, StopwatchError>) {
        match result {
            Ok(event) => self.render(event),
            Err(e) if e.is_redundant() => log::debug!("ignored: {}", e),
            Err(e) => {
                let message = match e {
                    StopwatchError::InvalidState { op: Operation::Lap, .. } => {
                        "Lap needs a running stopwatch"
                    }
                    StopwatchError::InvalidState { op: Operation::Reset, .. } => {
                        "Stop the stopwatch before resetting"
                    }
                    _ => "Not available right now",
                };
                let result = ui::draw_rejected(&mut self.out, message, self.config.bell)
                    .and_then(|_| ui::draw_clock(&mut self.out, &self.engine.display(), self.pulse));
                self.check(result);
            }
        }
    }

    fn render(&mut self, event: Event) {
        match &event {
            Event::Started { .. } => self.pulse = Pulse::Bright,
            Event::Stopped { .. } | Event::Reset { .. } => self.pulse = Pulse::Idle,
            Event::Tick { clock_changed: true, .. } => self.pulse = self.pulse.flip(),
            Event::Tick { .. } | Event::Lap(_) => {}
        }
        if self.help_visible {
            return;
        }

        let result = match &event {
            Event::Tick { display, .. } => ui::draw_clock(&mut self.out, display, self.pulse),
            Event::Lap(lap) => ui::draw_lap(&mut self.out, lap, self.config.show_splits).and_then(
                |_| ui::draw_clock(&mut self.out, &self.engine.display(), self.pulse),
            ),
            Event::Started { display } | Event::Stopped { display } | Event::Reset { display } => {
                ui::draw_controls(&mut self.out, self.engine.controls())
                    .and_then(|_| ui::draw_clock(&mut self.out, display, self.pulse))
            }
        };
        self.check(result);
    }

    fn shutdown(&mut self) {
        self.engine.shutdown();
        let result = writeln!(self.out);
        self.check(result);
    }

    fn check(&self, result: io::Result<()>) {
        if let Err(e) = result {
            log::warn!("can't draw: {}", e);
        }
    }
}

/// Keys carried by one stdin line. The terminal is line-buffered, so an
/// empty line is a bare Enter; whitespace is kept since space is bound.
fn line_keys(line: &str) -> Vec<char> {
    if line.is_empty() {
        vec![KEY_ENTER]
    } else {
        line.chars().collect()
    }
}

fn input_thread(main: Sender<Message>) {
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                log::error!("stdin: {}", e);
                break;
            }
        };
        for key in line_keys(&line) {
            if main.send(Message::scalar(AppOp::Rawkeys, key as u64, 0)).is_err() {
                return;
            }
        }
    }
    main.send(Message::scalar(AppOp::Quit, 0, 0)).ok();
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(DEFAULT_LOG_FILTER))
        .init();
    log::info!("{} PID is {}", APP_NAME, std::process::id());

    let config = ScreenConfig::from_env();
    let (main_tx, main_rx) = channel::unbounded::<Message>();

    let (scheduler, pump) = match pump::spawn(main_tx.clone()) {
        Ok(pump) => pump,
        Err(e) => {
            log::error!("can't start pump thread: {}", e);
            std::process::exit(1);
        }
    };
    let input_tx = main_tx.clone();
    if let Err(e) = thread::Builder::new()
        .name("input".into())
        .spawn(move || input_thread(input_tx))
    {
        log::error!("can't start input thread: {}", e);
        pump.quit();
        std::process::exit(1);
    }

    let mut screen = StopwatchScreen::new(SystemClock, scheduler, io::stdout(), config);
    main_tx.send(Message::scalar(AppOp::Redraw, 0, 0)).ok();

    loop {
        let msg = match main_rx.recv() {
            Ok(msg) => msg,
            Err(_) => break,
        };
        match FromPrimitive::from_usize(msg.id) {
            Some(AppOp::Redraw) => screen.redraw(),
            Some(AppOp::Rawkeys) => {
                let key = char::from_u32(msg.arg1 as u32).unwrap_or('\u{0000}');
                if key != '\u{0000}' && screen.handle_key(key) == Flow::Quit {
                    break;
                }
            }
            Some(AppOp::Pump) => {
                pump.ack();
                screen.handle_pump(TickToken(msg.arg1));
            }
            Some(AppOp::Quit) => break,
            None => log::error!("unknown opcode: {:?}", msg),
        }
    }

    // Clean up: cancel the schedule before the pump goes away
    screen.shutdown();
    drop(screen);
    pump.quit();
    log::info!("{} exiting", APP_NAME);
}
