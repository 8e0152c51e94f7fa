//! Main application state and logic.

use crate::config::Config;
use crate::models::{Completion, DailyStats, Settings, TimerEvent, TimerMode, TimerState};
use crate::monetization::{self, AdBanner};
use crate::persistence::{Database, DatabaseError};
use crate::stats::StatsLog;
use crate::streak::current_streak;
use crate::tasks::{TaskList, TaskSort};
use crate::theme::Theme;
use chrono::{DateTime, Local, NaiveDate, Utc};
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}

/// Application state shared by the tray and the CLI.
pub struct App {
    pub state: TimerState,
    pub settings: Settings,
    pub tasks: TaskList,
    pub stats: StatsLog,
    /// Presentation order of the task list; not persisted.
    pub task_sort: TaskSort,
    pub db: Database,
    /// Store version the loaded documents correspond to.
    store_version: i64,
}

/// The current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

impl App {
    /// Opens the database from `config` and loads all documents.
    pub fn open(config: &Config) -> Result<Self, AppError> {
        let db = Database::open(&config.db_path())?;
        Ok(Self::with_db(db))
    }

    /// Creates an app around an already opened database.
    pub fn with_db(db: Database) -> Self {
        let settings = db.load_settings();
        let tasks = TaskList::new(db.load_tasks());
        let stats = StatsLog::new(db.load_stats());
        info!(
            tasks = tasks.len(),
            days = stats.as_slice().len(),
            "loaded saved state"
        );

        let store_version = db.data_version().unwrap_or_default();

        Self {
            state: TimerState::new(&settings),
            settings,
            tasks,
            stats,
            task_sort: TaskSort::default(),
            db,
            store_version,
        }
    }

    /// Reloads the documents if another process (the CLI) committed to the
    /// store since they were read. Returns true when something was reloaded.
    pub fn reload_if_changed(&mut self) -> bool {
        let version = match self.db.data_version() {
            Ok(version) => version,
            Err(e) => {
                warn!(error = %e, "failed to check store version");
                return false;
            }
        };
        if version == self.store_version {
            return false;
        }
        self.store_version = version;

        let idle_at_full = self.idle_at_full(self.state.mode());
        self.settings = self.db.load_settings();
        self.tasks = TaskList::new(self.db.load_tasks());
        self.stats = StatsLog::new(self.db.load_stats());
        if idle_at_full {
            self.reset();
        }
        debug!("reloaded documents changed by another process");
        true
    }

    /// True if the timer is stopped at the full countdown of `mode`.
    fn idle_at_full(&self, mode: TimerMode) -> bool {
        !self.state.is_running()
            && self.state.mode() == mode
            && self.state.remaining_secs() == mode.total_secs(&self.settings)
    }

    fn handle(&mut self, event: TimerEvent) -> Option<Completion> {
        let completion = self.state.apply(event, &self.settings);
        debug!(?event, state = ?self.state, "timer event");
        if let Some(completion) = completion {
            self.finish(completion);
        }
        completion
    }

    fn finish(&mut self, completion: Completion) {
        info!(
            finished = completion.finished.label(),
            next = completion.next.label(),
            auto_started = completion.auto_started,
            "countdown complete"
        );
        if let Some(minutes) = completion.focus_minutes {
            self.record_focus(today(), minutes);
        }
    }

    fn record_focus(&mut self, date: NaiveDate, minutes: u32) {
        self.reload_if_changed();
        self.stats.record_session(date, minutes);
        if let Err(e) = self.db.save_stats(self.stats.as_slice()) {
            warn!(error = %e, "failed to save stats");
        }
    }

    /// Starts or pauses the countdown.
    pub fn toggle_run(&mut self) {
        self.handle(TimerEvent::ToggleRun);
    }

    /// Stops and loads the full duration of `mode`.
    pub fn switch_mode(&mut self, mode: TimerMode) {
        self.handle(TimerEvent::SwitchMode(mode));
    }

    /// Stops and restores the current mode's full duration.
    pub fn reset(&mut self) {
        self.handle(TimerEvent::Reset);
    }

    /// Advances the timer by one second.
    /// Returns (state_changed, optional_completion).
    pub fn tick(&mut self) -> (bool, Option<Completion>) {
        if !self.state.is_running() {
            return (false, None);
        }
        (true, self.handle(TimerEvent::Tick))
    }

    pub fn today_stats(&self) -> DailyStats {
        self.stats.for_date(today())
    }

    pub fn streak(&self) -> u32 {
        current_streak(self.stats.as_slice(), today())
    }

    fn save_tasks(&self) {
        if let Err(e) = self.db.save_tasks(self.tasks.as_slice()) {
            warn!(error = %e, "failed to save tasks");
        }
    }

    /// Adds a task, returning its id. Blank titles are ignored.
    pub fn add_task(&mut self, title: &str) -> Option<String> {
        self.reload_if_changed();
        let id = self
            .tasks
            .add(title, Utc::now().timestamp_millis())?
            .id
            .clone();
        self.save_tasks();
        Some(id)
    }

    pub fn toggle_task(&mut self, id: &str) -> Option<bool> {
        self.reload_if_changed();
        let completed = self.tasks.toggle(id)?;
        self.save_tasks();
        Some(completed)
    }

    pub fn rename_task(&mut self, id: &str, title: &str) -> bool {
        self.reload_if_changed();
        let renamed = self.tasks.rename(id, title);
        if renamed {
            self.save_tasks();
        }
        renamed
    }

    pub fn delete_task(&mut self, id: &str) -> bool {
        self.reload_if_changed();
        let deleted = self.tasks.delete(id).is_some();
        if deleted {
            self.save_tasks();
        }
        deleted
    }

    /// Moves a task within the stored order. Only allowed in manual order.
    pub fn reorder_tasks(&mut self, from: usize, to: usize) -> bool {
        self.reload_if_changed();
        if !self.task_sort.allows_reorder() {
            return false;
        }
        let moved = self.tasks.reorder(from, to);
        if moved {
            self.save_tasks();
        }
        moved
    }

    /// Deletes every completed task, one at a time. Returns how many went.
    pub fn delete_completed_tasks(&mut self) -> usize {
        self.reload_if_changed();
        let mut deleted = 0;
        for id in self.tasks.completed_ids() {
            if self.delete_task(&id) {
                deleted += 1;
            }
        }
        deleted
    }

    /// Updates settings, enforces their invariants and saves them.
    pub fn update_setting<F>(&mut self, updater: F)
    where
        F: FnOnce(&mut Settings),
    {
        self.reload_if_changed();
        updater(&mut self.settings);
        self.settings.sanitize();
        if let Err(e) = self.db.save_settings(&self.settings) {
            warn!(error = %e, "failed to save settings");
        }
    }

    /// Sets the length of `mode` in minutes. An idle timer showing that
    /// mode's full countdown picks up the new length.
    pub fn set_duration(&mut self, mode: TimerMode, mins: u32) {
        self.reload_if_changed();
        let idle_at_full = self.idle_at_full(mode);

        self.update_setting(|s| match mode {
            TimerMode::Focus => s.focus_duration = mins,
            TimerMode::ShortBreak => s.short_break_duration = mins,
            TimerMode::LongBreak => s.long_break_duration = mins,
        });

        if idle_at_full {
            self.reset();
        }
    }

    pub fn select_theme(&mut self, theme: Theme) {
        self.update_setting(|s| s.theme = theme);
    }

    /// Simulated one-time purchase that removes ads.
    pub fn purchase_premium(&mut self) {
        info!("premium purchased (simulated)");
        self.update_setting(|s| s.is_premium = true);
    }

    /// Applies the reward for watching the rewarded ad.
    pub fn grant_theme_unlock(&mut self, now: DateTime<Utc>) {
        let until = monetization::unlock_expiry(now);
        info!(%until, "theme unlock granted (simulated)");
        self.update_setting(|s| s.theme_unlocked_until = Some(until));
    }

    pub fn ad_banner(&self) -> AdBanner {
        AdBanner::for_settings(&self.settings)
    }
}
