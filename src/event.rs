//! Menu event handling.

use crate::app::App;
use crate::menu::{
    mode_from_id, ID_AUTO_BREAKS, ID_AUTO_FOCUS, ID_BUY_PREMIUM, ID_DARK_MODE,
    ID_DELETE_COMPLETED, ID_NOTIF_TOGGLE, ID_PERSONALIZED_ADS, ID_QUIT, ID_RESET,
    ID_SOUND_TOGGLE, ID_TOGGLE, ID_WATCH_AD, PREFIX_FOCUS, PREFIX_LONG, PREFIX_MODE,
    PREFIX_SHORT, PREFIX_SORT, PREFIX_SOUNDSCAPE, PREFIX_TASK, PREFIX_THEME, PREFIX_VOLUME,
};
use crate::models::{Soundscape, TimerMode};
use crate::monetization::rewarded_ad_available;
use crate::theme::Theme;
use muda::MenuEvent;
use tracing::debug;

/// Result of handling a menu event.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResult {
    /// Event handled, continue running.
    Continue,
    /// User requested quit.
    Quit,
    /// Timer state changed, live items need update.
    StateChanged,
    /// Tasks or settings changed, menu needs rebuild.
    MenuChanged,
    /// User asked to play the rewarded ad.
    WatchAd,
}

/// Handles a menu event and updates the app state accordingly.
pub fn handle_menu_event(app: &mut App, event: &MenuEvent) -> EventResult {
    handle_menu_id(app, event.id().as_ref())
}

/// Dispatches on a menu item id.
pub fn handle_menu_id(app: &mut App, id: &str) -> EventResult {
    debug!(id, "menu event");

    match id {
        ID_TOGGLE => {
            app.toggle_run();
            EventResult::StateChanged
        }
        ID_RESET => {
            app.reset();
            EventResult::StateChanged
        }
        ID_DELETE_COMPLETED => {
            app.delete_completed_tasks();
            EventResult::MenuChanged
        }
        ID_DARK_MODE => {
            app.update_setting(|s| s.dark_mode = !s.dark_mode);
            EventResult::MenuChanged
        }
        ID_AUTO_BREAKS => {
            app.update_setting(|s| s.auto_start_breaks = !s.auto_start_breaks);
            EventResult::MenuChanged
        }
        ID_AUTO_FOCUS => {
            app.update_setting(|s| s.auto_start_pomodoros = !s.auto_start_pomodoros);
            EventResult::MenuChanged
        }
        ID_SOUND_TOGGLE => {
            app.update_setting(|s| s.sound_enabled = !s.sound_enabled);
            EventResult::MenuChanged
        }
        ID_NOTIF_TOGGLE => {
            app.update_setting(|s| s.notifications_enabled = !s.notifications_enabled);
            EventResult::MenuChanged
        }
        ID_PERSONALIZED_ADS => {
            app.update_setting(|s| s.personalized_ads = !s.personalized_ads);
            EventResult::MenuChanged
        }
        ID_BUY_PREMIUM => {
            app.purchase_premium();
            EventResult::MenuChanged
        }
        ID_WATCH_AD if rewarded_ad_available(&app.settings) => EventResult::WatchAd,
        ID_QUIT => EventResult::Quit,
        _ => handle_prefixed(app, id).unwrap_or(EventResult::Continue),
    }
}

/// Handles the generated ids of submenu entries.
fn handle_prefixed(app: &mut App, id: &str) -> Option<EventResult> {
    if let Some(mode) = id.strip_prefix(PREFIX_MODE).and_then(mode_from_id) {
        app.switch_mode(mode);
        return Some(EventResult::StateChanged);
    }

    if let Some(task_id) = id.strip_prefix(PREFIX_TASK) {
        app.toggle_task(task_id)?;
        return Some(EventResult::MenuChanged);
    }

    if let Some(sort) = id.strip_prefix(PREFIX_SORT) {
        app.task_sort = sort.parse().ok()?;
        return Some(EventResult::MenuChanged);
    }

    if let Some(soundscape) = id
        .strip_prefix(PREFIX_SOUNDSCAPE)
        .and_then(Soundscape::from_id)
    {
        app.update_setting(|s| s.soundscape = soundscape);
        return Some(EventResult::MenuChanged);
    }

    if let Some(volume_str) = id.strip_prefix(PREFIX_VOLUME) {
        let volume = volume_str.parse::<u32>().ok()?;
        app.update_setting(|s| s.soundscape_volume = volume);
        return Some(EventResult::MenuChanged);
    }

    if let Some(theme) = id.strip_prefix(PREFIX_THEME).and_then(Theme::from_id) {
        app.select_theme(theme);
        return Some(EventResult::MenuChanged);
    }

    handle_duration_change(app, id)
}

/// Handles duration setting changes from submenus.
fn handle_duration_change(app: &mut App, id: &str) -> Option<EventResult> {
    let prefixes = [
        (PREFIX_FOCUS, TimerMode::Focus),
        (PREFIX_SHORT, TimerMode::ShortBreak),
        (PREFIX_LONG, TimerMode::LongBreak),
    ];

    for (prefix, mode) in prefixes {
        if let Some(mins_str) = id.strip_prefix(prefix) {
            let mins = mins_str.parse::<u32>().ok()?;
            app.set_duration(mode, mins);
            return Some(EventResult::MenuChanged);
        }
    }

    None
}
