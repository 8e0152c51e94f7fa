//! Countdown driver: ticks the shared app once a second.

use crate::app::App;
use crate::models::{Completion, Settings, TimerState};
use crate::ticker::Ticker;
use std::ops::ControlFlow;
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

/// Message sent from the timer thread to the main thread.
#[derive(Debug, Clone)]
pub enum TimerMessage {
    /// Timer state has changed, UI needs update.
    StateChanged,
    /// A countdown finished; play the chime, notify.
    Completed(Completion),
}

/// Arms the one-second countdown ticker for the lifetime of the returned
/// handle. Stops on its own once the main thread hangs up.
pub fn start_timer_loop(app: Arc<Mutex<App>>, tx: Sender<TimerMessage>) -> Ticker {
    Ticker::start(TICK_PERIOD, move || {
        let mut app = app.lock().unwrap_or_else(PoisonError::into_inner);
        let (changed, completion) = app.tick();

        if let Some(completion) = completion {
            if tx.send(TimerMessage::Completed(completion)).is_err() {
                return ControlFlow::Break(());
            }
        }

        if changed && tx.send(TimerMessage::StateChanged).is_err() {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    })
}

/// Formats the tray title based on current timer state.
pub fn format_tray_title(state: &TimerState, settings: &Settings) -> String {
    let icon = match state {
        TimerState::Paused {
            mode,
            remaining_secs,
        } if *remaining_secs == mode.total_secs(settings) => return "🍅".to_string(),
        TimerState::Paused { .. } => "⏸",
        TimerState::Running { mode, .. } if mode.is_break() => "☕",
        TimerState::Running { .. } => "🍅",
    };
    format!("{} {}", icon, format_time(state.remaining_secs()))
}

/// Formats time in MM:SS format.
pub fn format_time(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimerMode;
    use crate::persistence::Database;
    use std::sync::mpsc;

    #[test]
    fn test_format_tray_title_idle() {
        let settings = Settings::default();
        let state = TimerState::new(&settings);
        assert_eq!(format_tray_title(&state, &settings), "🍅");
    }

    #[test]
    fn test_format_tray_title_focus_running() {
        let state = TimerState::Running {
            mode: TimerMode::Focus,
            remaining_secs: 1432,
        };
        assert_eq!(format_tray_title(&state, &Settings::default()), "🍅 23:52");
    }

    #[test]
    fn test_format_tray_title_paused() {
        let state = TimerState::Paused {
            mode: TimerMode::Focus,
            remaining_secs: 600,
        };
        assert_eq!(format_tray_title(&state, &Settings::default()), "⏸ 10:00");
    }

    #[test]
    fn test_format_tray_title_break_running() {
        let state = TimerState::Running {
            mode: TimerMode::ShortBreak,
            remaining_secs: 272,
        };
        assert_eq!(format_tray_title(&state, &Settings::default()), "☕ 04:32");
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0), "00:00");
        assert_eq!(format_time(59), "00:59");
        assert_eq!(format_time(60), "01:00");
        assert_eq!(format_time(125), "02:05");
        assert_eq!(format_time(1500), "25:00");
        assert_eq!(format_time(3599), "59:59");
    }

    #[test]
    fn test_timer_loop_reports_ticks() {
        let mut app = App::with_db(Database::new_in_memory().unwrap());
        app.toggle_run();
        let app = Arc::new(Mutex::new(app));
        let (tx, rx) = mpsc::channel();

        let _ticker = start_timer_loop(Arc::clone(&app), tx);
        let msg = rx.recv_timeout(Duration::from_secs(5)).unwrap();

        assert!(matches!(msg, TimerMessage::StateChanged));
        let app = app.lock().unwrap();
        assert_eq!(format_tray_title(&app.state, &app.settings), "🍅 24:59");
    }
}
