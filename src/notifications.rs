//! Desktop notifications for timer events.

use crate::models::{Completion, TimerMode};
use notify_rust::Notification;
use std::thread;
use tracing::warn;

/// Summary and body for a completion notification.
pub fn completion_message(completion: &Completion, sessions_today: u32) -> (String, String) {
    match completion.finished {
        TimerMode::Focus => {
            let sessions = if sessions_today == 1 {
                "1 focus session".to_string()
            } else {
                format!("{} focus sessions", sessions_today)
            };
            let next = if completion.auto_started {
                "Your break has started."
            } else {
                "Time for a break."
            };
            (
                "Focus Complete! 🍅".to_string(),
                format!("Nice work! {} today.\n{}", sessions, next),
            )
        }
        TimerMode::ShortBreak | TimerMode::LongBreak => {
            let body = if completion.auto_started {
                "Back to focus - the next session has started."
            } else {
                "Ready to start another focus session?"
            };
            ("Break Over! ☕".to_string(), body.to_string())
        }
    }
}

/// Shows a notification for a finished countdown.
/// Runs in a background thread to avoid blocking.
pub fn notify_completion(completion: Completion, sessions_today: u32) {
    thread::spawn(move || {
        let (summary, body) = completion_message(&completion, sessions_today);
        if let Err(e) = Notification::new()
            .summary(&summary)
            .body(&body)
            .sound_name("default")
            .show()
        {
            warn!(error = %e, "failed to show notification");
        }
    });
}

/// Shows a notification once the rewarded ad has finished.
pub fn notify_theme_unlocked() {
    thread::spawn(move || {
        if let Err(e) = Notification::new()
            .summary("Theme Unlocked! 🎨")
            .body("Thanks for watching. (Simulation)")
            .show()
        {
            warn!(error = %e, "failed to show notification");
        }
    });
}
