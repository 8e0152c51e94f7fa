//! Periodic wake-ups on a background thread with explicit cancellation.

use std::ops::ControlFlow;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::{Duration, Instant};

/// Calls a closure every `period` until cancelled, dropped, or the closure
/// returns `ControlFlow::Break`.
///
/// Cancellation wakes the thread immediately; it never waits out the rest of
/// the current period. Wake-ups are scheduled against fixed deadlines, so time
/// spent inside the closure does not push later ticks back.
pub struct Ticker {
    stop: Option<Sender<()>>,
}

impl Ticker {
    pub fn start<F>(period: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() -> ControlFlow<()> + Send + 'static,
    {
        let (stop, stopped) = mpsc::channel::<()>();
        thread::spawn(move || {
            let mut deadline = Instant::now() + period;
            loop {
                let wait = deadline.saturating_duration_since(Instant::now());
                match stopped.recv_timeout(wait) {
                    Err(RecvTimeoutError::Timeout) => {
                        if on_tick().is_break() {
                            break;
                        }
                        deadline += period;
                    }
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                }
            }
        });
        Self { stop: Some(stop) }
    }

    /// Runs `on_fire` once after `delay`, unless cancelled first.
    pub fn once<F>(delay: Duration, on_fire: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        let mut on_fire = Some(on_fire);
        Self::start(delay, move || {
            if let Some(f) = on_fire.take() {
                f();
            }
            ControlFlow::Break(())
        })
    }

    pub fn cancel(&mut self) {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.cancel();
    }
}
