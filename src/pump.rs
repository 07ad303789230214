use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use chronox_core::{Scheduler, TickToken};
use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};
use num_traits::FromPrimitive;

use crate::bus::{AppOp, Message};

#[derive(Debug, num_derive::FromPrimitive, num_derive::ToPrimitive)]
enum PumpOp {
    Start = 0,
    Stop,
    Quit,
}

const MIN_INTERVAL_MS: u64 = 1;

/// `Scheduler` backed by the pump thread. Ticks arrive in the main loop as
/// `AppOp::Pump` messages carrying the token in `arg1`.
pub struct PumpScheduler {
    control: Sender<Message>,
    next_token: u64,
}

impl Scheduler for PumpScheduler {
    fn schedule_repeating(&mut self, period_ms: u64) -> TickToken {
        self.next_token += 1;
        let token = TickToken(self.next_token);
        self.control
            .send(Message::scalar(PumpOp::Start, period_ms, token.0))
            .ok();
        token
    }

    fn cancel(&mut self, token: TickToken) {
        self.control
            .send(Message::scalar(PumpOp::Stop, token.0, 0))
            .ok();
    }
}

/// Owner side of the pump thread.
pub struct PumpHandle {
    control: Sender<Message>,
    pending: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

impl PumpHandle {
    /// Called by the main loop for every `Pump` it takes off the queue, so
    /// the pump may post the next one.
    pub fn ack(&self) {
        self.pending.store(false, Ordering::Release);
    }

    pub fn quit(self) {
        self.control.send(Message::scalar(PumpOp::Quit, 0, 0)).ok();
        if self.thread.join().is_err() {
            log::error!("pump thread panicked");
        }
    }
}

pub fn spawn(main: Sender<Message>) -> io::Result<(PumpScheduler, PumpHandle)> {
    let (control, control_rx) = channel::unbounded();
    let pending = Arc::new(AtomicBool::new(false));
    let thread = {
        let pending = pending.clone();
        thread::Builder::new()
            .name("pump".into())
            .spawn(move || pump_thread(control_rx, main, pending))?
    };
    Ok((
        PumpScheduler { control: control.clone(), next_token: 0 },
        PumpHandle { control, pending, thread },
    ))
}

struct Schedule {
    token: u64,
    interval: Duration,
}

fn pump_thread(control: Receiver<Message>, main: Sender<Message>, pending: Arc<AtomicBool>) {
    let mut schedule: Option<Schedule> = None;

    loop {
        // Wait for control messages; time out into a tick when scheduled
        let envelope = match &schedule {
            Some(s) => match control.recv_timeout(s.interval) {
                Ok(msg) => Some(msg),
                Err(RecvTimeoutError::Timeout) => {
                    // At most one tick outstanding in the main loop
                    if !pending.swap(true, Ordering::AcqRel)
                        && main.send(Message::scalar(AppOp::Pump, s.token, 0)).is_err()
                    {
                        break;
                    }
                    None
                }
                Err(RecvTimeoutError::Disconnected) => break,
            },
            None => match control.recv() {
                Ok(msg) => Some(msg),
                Err(_) => break,
            },
        };

        let Some(msg) = envelope else { continue };
        match FromPrimitive::from_usize(msg.id) {
            Some(PumpOp::Start) => {
                let interval_ms = msg.arg1.max(MIN_INTERVAL_MS);
                log::debug!("pump start: token {} every {} ms", msg.arg2, interval_ms);
                schedule = Some(Schedule {
                    token: msg.arg2,
                    interval: Duration::from_millis(interval_ms),
                });
            }
            Some(PumpOp::Stop) => {
                if schedule.as_ref().map(|s| s.token) == Some(msg.arg1) {
                    log::debug!("pump stop: token {}", msg.arg1);
                    schedule = None;
                }
            }
            Some(PumpOp::Quit) => break,
            None => log::error!("pump: unknown opcode: {:?}", msg),
        }
    }
    log::debug!("pump thread exiting");
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAIT: Duration = Duration::from_secs(2);
    const QUIET: Duration = Duration::from_millis(60);

    fn is_pump(msg: &Message) -> bool {
        matches!(FromPrimitive::from_usize(msg.id), Some(AppOp::Pump))
    }

    #[test]
    fn test_pump_posts_one_tick_at_a_time() {
        let (tx, rx) = channel::unbounded();
        let (mut sched, handle) = spawn(tx).unwrap();

        let token = sched.schedule_repeating(2);
        let first = rx.recv_timeout(WAIT).unwrap();
        assert!(is_pump(&first));
        assert_eq!(first.arg1, token.0);

        // Not acked yet, so nothing more arrives
        assert!(rx.recv_timeout(QUIET).is_err());

        handle.ack();
        let second = rx.recv_timeout(WAIT).unwrap();
        assert_eq!(second.arg1, token.0);

        sched.cancel(token);
        handle.quit();
    }

    #[test]
    fn test_cancel_stops_ticks() {
        let (tx, rx) = channel::unbounded();
        let (mut sched, handle) = spawn(tx).unwrap();

        let token = sched.schedule_repeating(2);
        rx.recv_timeout(WAIT).unwrap();
        sched.cancel(token);

        thread::sleep(Duration::from_millis(20));
        rx.try_iter().for_each(drop);
        handle.ack();
        assert!(rx.recv_timeout(QUIET).is_err());

        handle.quit();
    }

    #[test]
    fn test_stale_cancel_keeps_new_schedule() {
        let (tx, rx) = channel::unbounded();
        let (mut sched, handle) = spawn(tx).unwrap();

        let old = sched.schedule_repeating(2);
        let live = sched.schedule_repeating(2);
        assert_ne!(old, live);
        sched.cancel(old);

        // Drain anything posted under the old token
        let msg = loop {
            let msg = rx.recv_timeout(WAIT).unwrap();
            handle.ack();
            if msg.arg1 == live.0 {
                break msg;
            }
        };
        assert!(is_pump(&msg));

        sched.cancel(live);
        handle.quit();
    }
}
