//! Menu building and updating for the tray dropdown.

use crate::app::App;
use crate::models::{DailyStats, Settings, Soundscape, TimerMode, TimerState};
use crate::monetization::rewarded_ad_available;
use crate::tasks::TaskSort;
use crate::theme::Theme;
use crate::timer::format_time;
use chrono::{DateTime, Utc};
use muda::accelerator::Accelerator;
use muda::{CheckMenuItem, Menu, MenuId, MenuItem, PredefinedMenuItem, Submenu};
use std::collections::HashMap;
use thiserror::Error;

// Menu item IDs as constants
pub const ID_STATUS: &str = "status";
pub const ID_PROGRESS: &str = "progress";
pub const ID_STATS: &str = "stats";
pub const ID_AD_BANNER: &str = "ad_banner";
pub const ID_TOGGLE: &str = "toggle";
pub const ID_RESET: &str = "reset";
pub const ID_DELETE_COMPLETED: &str = "delete_completed";
pub const ID_DARK_MODE: &str = "dark_mode";
pub const ID_AUTO_BREAKS: &str = "auto_breaks";
pub const ID_AUTO_FOCUS: &str = "auto_focus";
pub const ID_SOUND_TOGGLE: &str = "sound_toggle";
pub const ID_NOTIF_TOGGLE: &str = "notif_toggle";
pub const ID_PERSONALIZED_ADS: &str = "personalized_ads";
pub const ID_BUY_PREMIUM: &str = "buy_premium";
pub const ID_WATCH_AD: &str = "watch_ad";
pub const ID_QUIT: &str = "quit";

// Prefixes for generated item IDs
pub const PREFIX_MODE: &str = "mode_";
pub const PREFIX_TASK: &str = "task_";
pub const PREFIX_SORT: &str = "sort_";
pub const PREFIX_SOUNDSCAPE: &str = "soundscape_";
pub const PREFIX_VOLUME: &str = "volume_";
pub const PREFIX_THEME: &str = "theme_";
pub const PREFIX_FOCUS: &str = "focus_";
pub const PREFIX_SHORT: &str = "short_";
pub const PREFIX_LONG: &str = "long_";

pub const FOCUS_CHOICES: [u32; 6] = [15, 20, 25, 30, 45, 60];
pub const SHORT_CHOICES: [u32; 4] = [3, 5, 10, 15];
pub const LONG_CHOICES: [u32; 4] = [10, 15, 20, 30];
pub const VOLUME_CHOICES: [u32; 5] = [0, 25, 50, 75, 100];

#[derive(Error, Debug)]
pub enum MenuError {
    #[error("Menu error: {0}")]
    Muda(#[from] muda::Error),
}

/// Holds references to menu items that change every tick.
pub struct MenuItems {
    pub status: MenuItem,
    pub progress: MenuItem,
    pub stats: MenuItem,
    pub toggle: MenuItem,
    pub mode_checks: HashMap<TimerMode, CheckMenuItem>,
}

/// Stable identifier for a timer mode in menu IDs.
pub fn mode_id(mode: TimerMode) -> &'static str {
    match mode {
        TimerMode::Focus => "focus",
        TimerMode::ShortBreak => "short",
        TimerMode::LongBreak => "long",
    }
}

pub fn mode_from_id(id: &str) -> Option<TimerMode> {
    TimerMode::ALL.into_iter().find(|m| mode_id(*m) == id)
}

/// Builds the complete menu structure.
///
/// `ad_playing` disables the rewarded-ad entry while one is running.
pub fn build_menu(
    app: &App,
    now: DateTime<Utc>,
    ad_playing: bool,
) -> Result<(Menu, MenuItems), MenuError> {
    let menu = Menu::new();
    let state = &app.state;
    let settings = &app.settings;

    // Status display (disabled, info only)
    let status = info_item(ID_STATUS, format_status(state, settings));
    menu.append(&status)?;
    let progress = info_item(ID_PROGRESS, format_progress(state, settings));
    menu.append(&progress)?;

    menu.append(&PredefinedMenuItem::separator())?;

    let stats = info_item(ID_STATS, format_stats(&app.today_stats(), app.streak()));
    menu.append(&stats)?;

    if let Some(label) = app.ad_banner().label() {
        menu.append(&info_item(ID_AD_BANNER, label))?;
    }

    menu.append(&PredefinedMenuItem::separator())?;

    // Controls
    let toggle = MenuItem::with_id(
        MenuId::new(ID_TOGGLE),
        toggle_label(state),
        true,
        None::<Accelerator>,
    );
    menu.append(&toggle)?;
    let reset = MenuItem::with_id(MenuId::new(ID_RESET), "↺  Reset", true, None::<Accelerator>);
    menu.append(&reset)?;

    let mut mode_checks = HashMap::new();
    for mode in TimerMode::ALL {
        let item = CheckMenuItem::with_id(
            MenuId::new(format!("{}{}", PREFIX_MODE, mode_id(mode))),
            mode.label(),
            true,
            state.mode() == mode,
            None::<Accelerator>,
        );
        menu.append(&item)?;
        mode_checks.insert(mode, item);
    }

    menu.append(&PredefinedMenuItem::separator())?;

    menu.append(&build_tasks_submenu(app)?)?;
    menu.append(&build_soundscape_submenu(settings)?)?;
    menu.append(&build_theme_submenu(settings)?)?;
    menu.append(&build_settings_submenu(settings)?)?;
    menu.append(&build_premium_submenu(settings, now, ad_playing)?)?;

    menu.append(&PredefinedMenuItem::separator())?;

    // Quit
    let quit = MenuItem::with_id(
        MenuId::new(ID_QUIT),
        "Quit SereneFocus",
        true,
        None::<Accelerator>,
    );
    menu.append(&quit)?;

    let items = MenuItems {
        status,
        progress,
        stats,
        toggle,
        mode_checks,
    };

    Ok((menu, items))
}

fn info_item(id: &str, text: impl AsRef<str>) -> MenuItem {
    MenuItem::with_id(MenuId::new(id), text, false, None::<Accelerator>)
}

fn check_item(id: String, text: impl AsRef<str>, enabled: bool, checked: bool) -> CheckMenuItem {
    CheckMenuItem::with_id(MenuId::new(id), text, enabled, checked, None::<Accelerator>)
}

fn build_tasks_submenu(app: &App) -> Result<Submenu, MenuError> {
    let open = app.tasks.as_slice().iter().filter(|t| !t.completed).count();
    let submenu = Submenu::new(format!("☑  Tasks ({} open)", open), true);

    if app.tasks.is_empty() {
        submenu.append(&info_item("tasks_empty", "No tasks yet - add one with `serenefocus task add`"))?;
    }
    for task in app.tasks.sorted(app.task_sort) {
        submenu.append(&check_item(
            format!("{}{}", PREFIX_TASK, task.id),
            &task.title,
            true,
            task.completed,
        ))?;
    }

    submenu.append(&PredefinedMenuItem::separator())?;

    let sort_sub = Submenu::new(format!("Sort: {}", app.task_sort.label()), true);
    for sort in TaskSort::ALL {
        sort_sub.append(&check_item(
            format!("{}{}", PREFIX_SORT, sort.id()),
            sort.label(),
            true,
            sort == app.task_sort,
        ))?;
    }
    submenu.append(&sort_sub)?;

    let delete = MenuItem::with_id(
        MenuId::new(ID_DELETE_COMPLETED),
        "Delete Completed",
        app.tasks.as_slice().iter().any(|t| t.completed),
        None::<Accelerator>,
    );
    submenu.append(&delete)?;

    Ok(submenu)
}

fn build_soundscape_submenu(settings: &Settings) -> Result<Submenu, MenuError> {
    let submenu = Submenu::new(
        format!("🎧  Soundscape: {}", settings.soundscape.label()),
        true,
    );
    for soundscape in Soundscape::ALL {
        submenu.append(&check_item(
            format!("{}{}", PREFIX_SOUNDSCAPE, soundscape.id()),
            soundscape.label(),
            true,
            soundscape == settings.soundscape,
        ))?;
    }

    submenu.append(&PredefinedMenuItem::separator())?;

    let volume_sub = Submenu::new(format!("Volume: {}%", settings.soundscape_volume), true);
    for volume in VOLUME_CHOICES {
        volume_sub.append(&check_item(
            format!("{}{}", PREFIX_VOLUME, volume),
            format!("{}%", volume),
            true,
            volume == settings.soundscape_volume,
        ))?;
    }
    submenu.append(&volume_sub)?;

    Ok(submenu)
}

fn build_theme_submenu(settings: &Settings) -> Result<Submenu, MenuError> {
    let submenu = Submenu::new(format!("🎨  Theme: {}", settings.theme.label()), true);
    for theme in Theme::ALL {
        submenu.append(&check_item(
            format!("{}{}", PREFIX_THEME, theme.id()),
            theme.label(),
            true,
            theme == settings.theme,
        ))?;
    }

    submenu.append(&PredefinedMenuItem::separator())?;
    submenu.append(&check_item(
        ID_DARK_MODE.to_string(),
        "Dark Mode",
        true,
        settings.dark_mode,
    ))?;

    Ok(submenu)
}

fn duration_submenu(
    title: &str,
    prefix: &str,
    choices: &[u32],
    current: u32,
) -> Result<Submenu, MenuError> {
    let submenu = Submenu::new(format!("{}: {} min", title, current), true);
    for &mins in choices {
        submenu.append(&check_item(
            format!("{}{}", prefix, mins),
            format!("{} min", mins),
            true,
            mins == current,
        ))?;
    }
    Ok(submenu)
}

fn build_settings_submenu(settings: &Settings) -> Result<Submenu, MenuError> {
    let submenu = Submenu::new("⚙  Settings", true);

    submenu.append(&duration_submenu(
        "Focus",
        PREFIX_FOCUS,
        &FOCUS_CHOICES,
        settings.focus_duration,
    )?)?;
    submenu.append(&duration_submenu(
        "Short Break",
        PREFIX_SHORT,
        &SHORT_CHOICES,
        settings.short_break_duration,
    )?)?;
    submenu.append(&duration_submenu(
        "Long Break",
        PREFIX_LONG,
        &LONG_CHOICES,
        settings.long_break_duration,
    )?)?;

    submenu.append(&PredefinedMenuItem::separator())?;

    let toggles = [
        (ID_AUTO_BREAKS, "Auto-start Breaks", settings.auto_start_breaks),
        (ID_AUTO_FOCUS, "Auto-start Focus", settings.auto_start_pomodoros),
        (ID_SOUND_TOGGLE, "Completion Sound", settings.sound_enabled),
        (ID_NOTIF_TOGGLE, "Notifications", settings.notifications_enabled),
    ];
    for (id, label, checked) in toggles {
        submenu.append(&check_item(id.to_string(), label, true, checked))?;
    }

    submenu.append(&check_item(
        ID_PERSONALIZED_ADS.to_string(),
        "Personalized Ads",
        !settings.is_premium,
        settings.personalized_ads,
    ))?;

    Ok(submenu)
}

fn build_premium_submenu(
    settings: &Settings,
    now: DateTime<Utc>,
    ad_playing: bool,
) -> Result<Submenu, MenuError> {
    let submenu = Submenu::new("⭐  Premium", true);

    if settings.is_premium {
        submenu.append(&info_item("premium_owned", "✓  Ad-free - thank you!"))?;
        return Ok(submenu);
    }

    let buy = MenuItem::with_id(
        MenuId::new(ID_BUY_PREMIUM),
        "Go Ad-Free (simulated purchase)",
        true,
        None::<Accelerator>,
    );
    submenu.append(&buy)?;

    let watch_label = if ad_playing {
        "Playing ad…".to_string()
    } else {
        "Watch Ad to Unlock Premium Theme".to_string()
    };
    let watch = MenuItem::with_id(
        MenuId::new(ID_WATCH_AD),
        watch_label,
        rewarded_ad_available(settings) && !ad_playing,
        None::<Accelerator>,
    );
    submenu.append(&watch)?;

    if let Some(until) = settings
        .theme_unlocked_until
        .filter(|_| settings.has_theme_unlock(now))
    {
        submenu.append(&info_item(
            "unlock_until",
            format!(
                "Unlocked until {}",
                until.with_timezone(&chrono::Local).format("%a %H:%M")
            ),
        ))?;
    }

    Ok(submenu)
}

/// Updates the per-tick menu items.
pub fn update_menu_items(items: &MenuItems, app: &App) {
    items.status.set_text(format_status(&app.state, &app.settings));
    items.progress.set_text(format_progress(&app.state, &app.settings));
    items
        .stats
        .set_text(format_stats(&app.today_stats(), app.streak()));
    items.toggle.set_text(toggle_label(&app.state));

    let current = app.state.mode();
    for (mode, check) in &items.mode_checks {
        check.set_checked(*mode == current);
    }
}

pub fn toggle_label(state: &TimerState) -> &'static str {
    if state.is_running() {
        "⏸  Pause"
    } else {
        "▶  Start"
    }
}

/// Formats the status line for the menu.
pub fn format_status(state: &TimerState, settings: &Settings) -> String {
    let mode = state.mode();
    let remaining = state.remaining_secs();
    match state {
        TimerState::Running { .. } if mode.is_break() => {
            format!("☕  {} - {}", mode.label(), format_time(remaining))
        }
        TimerState::Running { .. } => format!("⏱  {} remaining", format_time(remaining)),
        TimerState::Paused { .. } if remaining == mode.total_secs(settings) => {
            format!("Ready: {} ({})", mode.label(), format_time(remaining))
        }
        TimerState::Paused { .. } => {
            format!("⏸  {} - {} (paused)", mode.label(), format_time(remaining))
        }
    }
}

/// Formats the progress bar for the menu.
pub fn format_progress(state: &TimerState, settings: &Settings) -> String {
    let pct = state.progress_percent(settings);
    let filled = (pct * 20.0).round() as usize;
    let empty = 20 - filled.min(20);
    format!(
        "{}{}  {}%",
        "█".repeat(filled.min(20)),
        "░".repeat(empty),
        (pct * 100.0).round() as u32
    )
}

/// Formats today's stats and the streak for the menu.
pub fn format_stats(today: &DailyStats, streak: u32) -> String {
    let sessions = today.sessions_completed;
    let streak = format!("🔥 {}", streak);

    if sessions == 0 {
        return format!("Today: —  0 (0 min)   {}", streak);
    }

    let tomatoes = "🍅".repeat(sessions.min(10) as usize);
    let extra = if sessions > 10 {
        format!("+{}", sessions - 10)
    } else {
        String::new()
    };
    format!(
        "Today: {}{}  {} ({} min)   {}",
        tomatoes, extra, sessions, today.minutes_focused, streak
    )
}
