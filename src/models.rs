//! Data models for the SereneFocus application.

use crate::theme::Theme;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three countdown modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimerMode {
    Focus,
    ShortBreak,
    LongBreak,
}

impl TimerMode {
    pub const ALL: [TimerMode; 3] = [Self::Focus, Self::ShortBreak, Self::LongBreak];

    pub fn label(self) -> &'static str {
        match self {
            Self::Focus => "Focus",
            Self::ShortBreak => "Short Break",
            Self::LongBreak => "Long Break",
        }
    }

    /// Configured length of this mode in minutes.
    pub fn duration_mins(self, settings: &Settings) -> u32 {
        match self {
            Self::Focus => settings.focus_duration,
            Self::ShortBreak => settings.short_break_duration,
            Self::LongBreak => settings.long_break_duration,
        }
    }

    pub fn total_secs(self, settings: &Settings) -> u32 {
        self.duration_mins(settings).saturating_mul(60)
    }

    pub fn is_break(self) -> bool {
        !matches!(self, Self::Focus)
    }
}

/// Inputs to the timer state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    SwitchMode(TimerMode),
    ToggleRun,
    Tick,
    Reset,
}

/// Outcome of a countdown reaching zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Completion {
    pub finished: TimerMode,
    pub next: TimerMode,
    /// Whether the next mode was started automatically.
    pub auto_started: bool,
    /// Minutes to credit to today's stats; only set for focus sessions.
    pub focus_minutes: Option<u32>,
}

/// Timer state: a mode crossed with a running/paused flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Paused { mode: TimerMode, remaining_secs: u32 },
    Running { mode: TimerMode, remaining_secs: u32 },
}

impl TimerState {
    /// A paused focus countdown loaded with the configured focus duration.
    pub fn new(settings: &Settings) -> Self {
        Self::loaded(TimerMode::Focus, settings)
    }

    fn loaded(mode: TimerMode, settings: &Settings) -> Self {
        Self::Paused {
            mode,
            remaining_secs: mode.total_secs(settings),
        }
    }

    pub fn mode(&self) -> TimerMode {
        match *self {
            Self::Paused { mode, .. } | Self::Running { mode, .. } => mode,
        }
    }

    pub fn remaining_secs(&self) -> u32 {
        match *self {
            Self::Paused { remaining_secs, .. } | Self::Running { remaining_secs, .. } => {
                remaining_secs
            }
        }
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running { .. })
    }

    /// Returns the progress (0.0 to 1.0) through the current mode.
    pub fn progress_percent(&self, settings: &Settings) -> f32 {
        let total_secs = self.mode().total_secs(settings);
        if total_secs == 0 {
            return 1.0;
        }
        let remaining = self.remaining_secs().min(total_secs);
        1.0 - (remaining as f32 / total_secs as f32)
    }

    /// Applies an event, returning the completion if the countdown finished.
    pub fn apply(&mut self, event: TimerEvent, settings: &Settings) -> Option<Completion> {
        match event {
            TimerEvent::SwitchMode(mode) => {
                *self = Self::loaded(mode, settings);
                None
            }
            TimerEvent::Reset => {
                *self = Self::loaded(self.mode(), settings);
                None
            }
            TimerEvent::ToggleRun => {
                *self = match *self {
                    Self::Paused {
                        mode,
                        remaining_secs,
                    } => Self::Running {
                        mode,
                        remaining_secs,
                    },
                    Self::Running {
                        mode,
                        remaining_secs,
                    } => Self::Paused {
                        mode,
                        remaining_secs,
                    },
                };
                None
            }
            TimerEvent::Tick => match *self {
                Self::Paused { .. } => None,
                Self::Running {
                    mode,
                    remaining_secs,
                } => {
                    let remaining_secs = remaining_secs.saturating_sub(1);
                    if remaining_secs == 0 {
                        Some(self.complete(mode, settings))
                    } else {
                        *self = Self::Running {
                            mode,
                            remaining_secs,
                        };
                        None
                    }
                }
            },
        }
    }

    // Long breaks are never entered from here, only through SwitchMode.
    fn complete(&mut self, finished: TimerMode, settings: &Settings) -> Completion {
        let (next, auto_start) = match finished {
            TimerMode::Focus => (TimerMode::ShortBreak, settings.auto_start_breaks),
            TimerMode::ShortBreak | TimerMode::LongBreak => {
                (TimerMode::Focus, settings.auto_start_pomodoros)
            }
        };

        let remaining_secs = next.total_secs(settings);
        *self = if auto_start {
            Self::Running {
                mode: next,
                remaining_secs,
            }
        } else {
            Self::Paused {
                mode: next,
                remaining_secs,
            }
        };

        Completion {
            finished,
            next,
            auto_started: auto_start,
            focus_minutes: (finished == TimerMode::Focus).then_some(settings.focus_duration),
        }
    }
}

/// Ambient background loops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Soundscape {
    #[default]
    Silent,
    Rain,
    Forest,
    Fire,
    Waves,
}

impl Soundscape {
    pub const ALL: [Soundscape; 5] = [
        Self::Silent,
        Self::Rain,
        Self::Forest,
        Self::Fire,
        Self::Waves,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Self::Silent => "none",
            Self::Rain => "rain",
            Self::Forest => "forest",
            Self::Fire => "fire",
            Self::Waves => "waves",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Silent => "Silent",
            Self::Rain => "Gentle Rain",
            Self::Forest => "Forest Ambiance",
            Self::Fire => "Cozy Fireplace",
            Self::Waves => "Ocean Waves",
        }
    }

    pub fn is_silent(self) -> bool {
        self == Self::Silent
    }

    /// Looks up a soundscape by its stored identifier.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.id() == id)
    }
}

impl From<String> for Soundscape {
    fn from(id: String) -> Self {
        Self::from_id(&id).unwrap_or_default()
    }
}

impl From<Soundscape> for String {
    fn from(soundscape: Soundscape) -> Self {
        soundscape.id().to_string()
    }
}

impl fmt::Display for Soundscape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

pub const MAX_VOLUME: u32 = 100;

/// Longest configurable countdown, one day.
pub const MAX_DURATION_MINS: u32 = 24 * 60;

/// User-configurable settings, persisted as a single JSON document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Duration of a focus session in minutes.
    pub focus_duration: u32,
    /// Duration of a short break in minutes.
    pub short_break_duration: u32,
    /// Duration of a long break in minutes.
    pub long_break_duration: u32,
    /// Start the break automatically when a focus session ends.
    pub auto_start_breaks: bool,
    /// Start the next focus session automatically when a break ends.
    pub auto_start_pomodoros: bool,
    /// Whether to play the chime on timer completion.
    pub sound_enabled: bool,
    #[serde(default)]
    pub soundscape: Soundscape,
    /// Ambient volume, 0 to 100.
    #[serde(default = "default_volume")]
    pub soundscape_volume: u32,
    pub dark_mode: bool,
    /// Simulated ad-free purchase.
    pub is_premium: bool,
    pub theme: Theme,
    #[serde(default = "default_true")]
    pub personalized_ads: bool,
    #[serde(default = "default_true")]
    pub notifications_enabled: bool,
    /// Expiry of a theme unlock earned by watching a rewarded ad.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme_unlocked_until: Option<DateTime<Utc>>,
}

/// Fields introduced after the first release; absent from older documents.
pub const BACKFILLED_SETTINGS_FIELDS: [&str; 4] = [
    "soundscape",
    "soundscapeVolume",
    "personalizedAds",
    "notificationsEnabled",
];

fn default_volume() -> u32 {
    50
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            focus_duration: 25,
            short_break_duration: 5,
            long_break_duration: 15,
            auto_start_breaks: false,
            auto_start_pomodoros: false,
            sound_enabled: true,
            soundscape: Soundscape::Silent,
            soundscape_volume: default_volume(),
            dark_mode: false,
            is_premium: false,
            theme: Theme::Rose,
            personalized_ads: true,
            notifications_enabled: true,
            theme_unlocked_until: None,
        }
    }
}

impl Settings {
    /// Enforces durations within 1..=MAX_DURATION_MINS and a volume within 0..=100.
    pub fn sanitize(&mut self) {
        for mins in [
            &mut self.focus_duration,
            &mut self.short_break_duration,
            &mut self.long_break_duration,
        ] {
            *mins = (*mins).clamp(1, MAX_DURATION_MINS);
        }
        self.soundscape_volume = self.soundscape_volume.min(MAX_VOLUME);
    }

    /// Target playback volume for the ambient loop, 0.0 to 1.0.
    pub fn ambient_volume(&self) -> f32 {
        self.soundscape_volume.min(MAX_VOLUME) as f32 / MAX_VOLUME as f32
    }

    /// Returns true while a rewarded-ad theme unlock is in effect.
    pub fn has_theme_unlock(&self, now: DateTime<Utc>) -> bool {
        self.theme_unlocked_until.is_some_and(|until| until > now)
    }
}

/// A single entry in the task list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
    pub completed: bool,
}

/// Focus totals for one calendar day.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub minutes_focused: u32,
    pub sessions_completed: u32,
}

impl DailyStats {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            minutes_focused: 0,
            sessions_completed: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn run(state: &mut TimerState, settings: &Settings, ticks: u32) -> Option<Completion> {
        let mut completion = None;
        for _ in 0..ticks {
            if let Some(c) = state.apply(TimerEvent::Tick, settings) {
                completion = Some(c);
            }
        }
        completion
    }

    #[test]
    fn test_new_state_is_paused_focus() {
        let settings = Settings::default();
        let state = TimerState::new(&settings);
        assert_eq!(state.mode(), TimerMode::Focus);
        assert_eq!(state.remaining_secs(), 25 * 60);
        assert!(!state.is_running());
    }

    #[test]
    fn test_switch_mode_then_reset_restores_full_duration() {
        let settings = Settings {
            focus_duration: 40,
            short_break_duration: 7,
            long_break_duration: 22,
            ..Settings::default()
        };
        for mode in TimerMode::ALL {
            let mut state = TimerState::new(&settings);
            state.apply(TimerEvent::ToggleRun, &settings);
            state.apply(TimerEvent::SwitchMode(mode), &settings);
            assert!(!state.is_running());
            state.apply(TimerEvent::Reset, &settings);
            assert_eq!(state.mode(), mode);
            assert_eq!(state.remaining_secs(), mode.duration_mins(&settings) * 60);
        }
    }

    #[test]
    fn test_reset_keeps_mode_and_stops() {
        let settings = Settings::default();
        let mut state = TimerState::new(&settings);
        state.apply(TimerEvent::SwitchMode(TimerMode::LongBreak), &settings);
        state.apply(TimerEvent::ToggleRun, &settings);
        run(&mut state, &settings, 30);
        state.apply(TimerEvent::Reset, &settings);
        assert_eq!(
            state,
            TimerState::Paused {
                mode: TimerMode::LongBreak,
                remaining_secs: 15 * 60
            }
        );
    }

    #[test]
    fn test_tick_while_paused_is_noop() {
        let settings = Settings::default();
        let mut state = TimerState::new(&settings);
        assert!(state.apply(TimerEvent::Tick, &settings).is_none());
        assert_eq!(state.remaining_secs(), 25 * 60);
    }

    #[test]
    fn test_toggle_pauses_and_resumes() {
        let settings = Settings::default();
        let mut state = TimerState::new(&settings);
        state.apply(TimerEvent::ToggleRun, &settings);
        run(&mut state, &settings, 10);
        state.apply(TimerEvent::ToggleRun, &settings);
        assert!(!state.is_running());
        assert_eq!(state.remaining_secs(), 25 * 60 - 10);
        run(&mut state, &settings, 10);
        assert_eq!(state.remaining_secs(), 25 * 60 - 10);
    }

    #[test]
    fn test_focus_completion_auto_starts_break() {
        let settings = Settings {
            focus_duration: 1,
            auto_start_breaks: true,
            ..Settings::default()
        };
        let mut state = TimerState::new(&settings);
        state.apply(TimerEvent::ToggleRun, &settings);

        assert!(run(&mut state, &settings, 59).is_none());
        let completion = state.apply(TimerEvent::Tick, &settings).unwrap();

        assert_eq!(completion.finished, TimerMode::Focus);
        assert_eq!(completion.next, TimerMode::ShortBreak);
        assert_eq!(completion.focus_minutes, Some(1));
        assert!(completion.auto_started);
        assert_eq!(
            state,
            TimerState::Running {
                mode: TimerMode::ShortBreak,
                remaining_secs: 5 * 60
            }
        );
    }

    #[test]
    fn test_focus_completion_without_auto_start_stays_paused() {
        let settings = Settings {
            focus_duration: 1,
            ..Settings::default()
        };
        let mut state = TimerState::new(&settings);
        state.apply(TimerEvent::ToggleRun, &settings);
        let completion = run(&mut state, &settings, 60).unwrap();

        assert!(!completion.auto_started);
        assert_eq!(
            state,
            TimerState::Paused {
                mode: TimerMode::ShortBreak,
                remaining_secs: 5 * 60
            }
        );
    }

    #[test]
    fn test_break_completion_returns_to_focus() {
        let settings = Settings {
            short_break_duration: 1,
            long_break_duration: 1,
            auto_start_pomodoros: true,
            ..Settings::default()
        };
        for mode in [TimerMode::ShortBreak, TimerMode::LongBreak] {
            let mut state = TimerState::new(&settings);
            state.apply(TimerEvent::SwitchMode(mode), &settings);
            state.apply(TimerEvent::ToggleRun, &settings);
            let completion = run(&mut state, &settings, 60).unwrap();

            assert_eq!(completion.finished, mode);
            assert_eq!(completion.next, TimerMode::Focus);
            assert_eq!(completion.focus_minutes, None);
            assert_eq!(
                state,
                TimerState::Running {
                    mode: TimerMode::Focus,
                    remaining_secs: 25 * 60
                }
            );
        }
    }

    #[test]
    fn test_running_at_zero_completes_on_next_tick() {
        let settings = Settings::default();
        let mut state = TimerState::Running {
            mode: TimerMode::Focus,
            remaining_secs: 0,
        };
        let completion = state.apply(TimerEvent::Tick, &settings);
        assert!(completion.is_some());
        assert_eq!(state.mode(), TimerMode::ShortBreak);
    }

    #[test]
    fn test_long_break_never_entered_by_completion() {
        let settings = Settings {
            focus_duration: 1,
            short_break_duration: 1,
            auto_start_breaks: true,
            auto_start_pomodoros: true,
            ..Settings::default()
        };
        let mut state = TimerState::new(&settings);
        state.apply(TimerEvent::ToggleRun, &settings);
        for _ in 0..(60 * 10) {
            state.apply(TimerEvent::Tick, &settings);
            assert_ne!(state.mode(), TimerMode::LongBreak);
        }
    }

    #[test]
    fn test_progress_percent() {
        let settings = Settings::default();
        let state = TimerState::Running {
            mode: TimerMode::Focus,
            remaining_secs: 1200,
        };
        assert!((state.progress_percent(&settings) - 0.2).abs() < 0.01);

        let state = TimerState::Paused {
            mode: TimerMode::ShortBreak,
            remaining_secs: 150,
        };
        assert!((state.progress_percent(&settings) - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.focus_duration, 25);
        assert_eq!(settings.short_break_duration, 5);
        assert_eq!(settings.long_break_duration, 15);
        assert!(!settings.auto_start_breaks);
        assert!(!settings.auto_start_pomodoros);
        assert!(settings.sound_enabled);
        assert_eq!(settings.soundscape, Soundscape::Silent);
        assert_eq!(settings.soundscape_volume, 50);
        assert_eq!(settings.theme, Theme::Rose);
        assert!(settings.personalized_ads);
        assert!(!settings.is_premium);
    }

    #[test]
    fn test_settings_sanitize() {
        let mut settings = Settings {
            focus_duration: 0,
            short_break_duration: 0,
            long_break_duration: 0,
            soundscape_volume: 250,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.focus_duration, 1);
        assert_eq!(settings.short_break_duration, 1);
        assert_eq!(settings.long_break_duration, 1);
        assert_eq!(settings.soundscape_volume, 100);
    }

    #[test]
    fn test_settings_json_uses_camel_case_keys() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["focusDuration"], 25);
        assert_eq!(json["soundscape"], "none");
        assert_eq!(json["theme"], "rose");
        assert!(json.get("themeUnlockedUntil").is_none());
    }

    #[test]
    fn test_unknown_identifiers_fall_back() {
        let mut json = serde_json::to_value(Settings::default()).unwrap();
        json["soundscape"] = "thunder".into();
        json["theme"] = "neon".into();
        let settings: Settings = serde_json::from_value(json).unwrap();
        assert_eq!(settings.soundscape, Soundscape::Silent);
        assert_eq!(settings.theme, Theme::Rose);
    }

    #[test]
    fn test_theme_unlock_window() {
        let now = Utc::now();
        let mut settings = Settings::default();
        assert!(!settings.has_theme_unlock(now));

        settings.theme_unlocked_until = Some(now + Duration::hours(24));
        assert!(settings.has_theme_unlock(now));
        assert!(!settings.has_theme_unlock(now + Duration::hours(25)));
    }

    #[test]
    fn test_settings_sanitize_caps_durations() {
        let mut settings = Settings {
            focus_duration: 100_000_000,
            short_break_duration: u32::MAX,
            long_break_duration: MAX_DURATION_MINS,
            ..Settings::default()
        };
        settings.sanitize();
        assert_eq!(settings.focus_duration, MAX_DURATION_MINS);
        assert_eq!(settings.short_break_duration, MAX_DURATION_MINS);
        assert_eq!(settings.long_break_duration, MAX_DURATION_MINS);
    }

    #[test]
    fn test_total_secs_saturates() {
        let settings = Settings {
            focus_duration: 100_000_000,
            ..Settings::default()
        };
        assert_eq!(TimerMode::Focus.total_secs(&settings), u32::MAX);
        let state = TimerState::new(&settings);
        assert_eq!(state.remaining_secs(), u32::MAX);
    }

    #[test]
    fn test_daily_stats_serializes_iso_date() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
        let stats = DailyStats::new(date);
        let json = serde_json::to_string(&stats).unwrap();
        assert_eq!(
            json,
            r#"{"date":"2024-01-15","minutesFocused":0,"sessionsCompleted":0}"#
        );
    }
}
