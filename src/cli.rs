//! Command-line surface for the things the tray menu cannot take as input.

use crate::app::{today, App};
use crate::models::{Soundscape, TimerMode, MAX_DURATION_MINS, MAX_VOLUME};
use crate::tasks::TaskSort;
use crate::theme::Theme;
use clap::{Parser, Subcommand};
use std::io::{self, Write};
use thiserror::Error;

/// SereneFocus - a calm menubar Pomodoro timer.
///
/// Runs the tray app when started without a subcommand.
#[derive(Parser, Debug)]
#[command(name = "serenefocus")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "\
ENVIRONMENT VARIABLES:
    SERENEFOCUS_DATA_DIR   Data directory (database and soundscapes/)
    RUST_LOG               Log filter (default: info)

EXAMPLES:
    serenefocus task add \"Write the quarterly report\"
    serenefocus task list --sort status
    serenefocus settings set focusDuration 50
    serenefocus stats --days 14
")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage tasks
    Task {
        #[command(subcommand)]
        command: TaskCommand,
    },
    /// Show the streak and recent daily totals
    Stats {
        /// Number of days to show, ending today
        #[arg(short, long, default_value_t = 7)]
        days: u32,
    },
    /// Show or change settings
    Settings {
        #[command(subcommand)]
        command: SettingsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum TaskCommand {
    /// Add a new task
    Add {
        /// Task title (quoted if it has spaces)
        title: String,
    },
    /// List tasks
    List {
        /// Sort view: order, alpha or status
        #[arg(short, long, default_value_t = TaskSort::Order)]
        sort: TaskSort,
    },
    /// Mark a task done, or not done again
    Toggle { id: String },
    /// Give a task a new title
    Rename { id: String, title: String },
    /// Remove a task
    Delete { id: String },
    /// Move a task between positions (1-based, as shown by `task list`)
    Move { from: usize, to: usize },
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommand {
    /// Print the stored settings
    Show,
    /// Change one setting, e.g. `set focusDuration 50`
    Set { key: String, value: String },
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    InvalidInput(String),
    #[error("No task with id '{0}'")]
    UnknownTask(String),
    #[error("Output error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

fn invalid(msg: impl Into<String>) -> CliError {
    CliError::InvalidInput(msg.into())
}

/// Runs one subcommand against the app, writing its report to `out`.
pub fn run(app: &mut App, command: Command, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        Command::Task { command } => run_task(app, command, out),
        Command::Stats { days } => run_stats(app, days, out),
        Command::Settings { command } => run_settings(app, command, out),
    }
}

fn run_task(app: &mut App, command: TaskCommand, out: &mut impl Write) -> Result<(), CliError> {
    match command {
        TaskCommand::Add { title } => {
            let id = app
                .add_task(&title)
                .ok_or_else(|| invalid("Task title cannot be empty"))?;
            writeln!(out, "Task added (id = {})", id)?;
        }
        TaskCommand::List { sort } => {
            let tasks = app.tasks.sorted(sort);
            if tasks.is_empty() {
                writeln!(out, "No tasks.")?;
            }
            for (pos, task) in tasks.iter().enumerate() {
                let mark = if task.completed { "x" } else { " " };
                writeln!(out, "{:>3}. [{}] {}  ({})", pos + 1, mark, task.title, task.id)?;
            }
        }
        TaskCommand::Toggle { id } => {
            let completed = app
                .toggle_task(&id)
                .ok_or_else(|| CliError::UnknownTask(id.clone()))?;
            let state = if completed { "done" } else { "open" };
            writeln!(out, "Task {} is now {}", id, state)?;
        }
        TaskCommand::Rename { id, title } => {
            if title.trim().is_empty() {
                return Err(invalid("Task title cannot be empty"));
            }
            if !app.rename_task(&id, &title) {
                return Err(CliError::UnknownTask(id));
            }
            writeln!(out, "Task {} renamed", id)?;
        }
        TaskCommand::Delete { id } => {
            if !app.delete_task(&id) {
                return Err(CliError::UnknownTask(id));
            }
            writeln!(out, "Task {} deleted", id)?;
        }
        TaskCommand::Move { from, to } => {
            let (Some(from_idx), Some(to_idx)) = (from.checked_sub(1), to.checked_sub(1)) else {
                return Err(invalid("Positions start at 1"));
            };
            if !app.reorder_tasks(from_idx, to_idx) {
                return Err(invalid(format!(
                    "Cannot move {} to {}: there are {} tasks",
                    from,
                    to,
                    app.tasks.len()
                )));
            }
            writeln!(out, "Task moved from {} to {}", from, to)?;
        }
    }
    Ok(())
}

fn run_stats(app: &App, days: u32, out: &mut impl Write) -> Result<(), CliError> {
    let streak = app.streak();
    let plural = if streak == 1 { "" } else { "s" };
    writeln!(out, "Streak: {} day{}", streak, plural)?;
    writeln!(out)?;

    for day in app.stats.recent(days, today()) {
        writeln!(
            out,
            "{}  {:>2} sessions  {:>4} min",
            day.date, day.sessions_completed, day.minutes_focused
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "All time: {} sessions, {} min",
        app.stats.total_sessions(),
        app.stats.total_minutes()
    )?;
    Ok(())
}

fn run_settings(
    app: &mut App,
    command: SettingsCommand,
    out: &mut impl Write,
) -> Result<(), CliError> {
    match command {
        SettingsCommand::Show => {
            writeln!(out, "{}", serde_json::to_string_pretty(&app.settings)?)?;
        }
        SettingsCommand::Set { key, value } => {
            set_setting(app, &key, &value)?;
            writeln!(out, "{} = {}", key, value)?;
        }
    }
    Ok(())
}

/// Applies one `key value` pair. Keys use the stored document's names.
fn set_setting(app: &mut App, key: &str, value: &str) -> Result<(), CliError> {
    match key {
        "focusDuration" => app.set_duration(TimerMode::Focus, parse_minutes(value)?),
        "shortBreakDuration" => app.set_duration(TimerMode::ShortBreak, parse_minutes(value)?),
        "longBreakDuration" => app.set_duration(TimerMode::LongBreak, parse_minutes(value)?),
        "autoStartBreaks" => {
            let on = parse_bool(value)?;
            app.update_setting(|s| s.auto_start_breaks = on);
        }
        "autoStartPomodoros" => {
            let on = parse_bool(value)?;
            app.update_setting(|s| s.auto_start_pomodoros = on);
        }
        "soundEnabled" => {
            let on = parse_bool(value)?;
            app.update_setting(|s| s.sound_enabled = on);
        }
        "notificationsEnabled" => {
            let on = parse_bool(value)?;
            app.update_setting(|s| s.notifications_enabled = on);
        }
        "darkMode" => {
            let on = parse_bool(value)?;
            app.update_setting(|s| s.dark_mode = on);
        }
        "personalizedAds" => {
            let on = parse_bool(value)?;
            app.update_setting(|s| s.personalized_ads = on);
        }
        "soundscapeVolume" => {
            let volume = value
                .parse::<u32>()
                .ok()
                .filter(|v| *v <= MAX_VOLUME)
                .ok_or_else(|| invalid(format!("Volume must be 0-{}, got '{}'", MAX_VOLUME, value)))?;
            app.update_setting(|s| s.soundscape_volume = volume);
        }
        "soundscape" => {
            let soundscape = Soundscape::from_id(value).ok_or_else(|| {
                let ids: Vec<_> = Soundscape::ALL.iter().map(|s| s.id()).collect();
                invalid(format!("Unknown soundscape '{}', expected one of {}", value, ids.join(", ")))
            })?;
            app.update_setting(|s| s.soundscape = soundscape);
        }
        "theme" => {
            let theme = Theme::from_id(value).ok_or_else(|| {
                let ids: Vec<_> = Theme::ALL.iter().map(|t| t.id()).collect();
                invalid(format!("Unknown theme '{}', expected one of {}", value, ids.join(", ")))
            })?;
            app.select_theme(theme);
        }
        _ => return Err(invalid(format!("Unknown setting '{}'", key))),
    }
    Ok(())
}

fn parse_minutes(value: &str) -> Result<u32, CliError> {
    value
        .parse::<u32>()
        .ok()
        .filter(|mins| (1..=MAX_DURATION_MINS).contains(mins))
        .ok_or_else(|| {
            invalid(format!(
                "Duration must be 1-{} minutes, got '{}'",
                MAX_DURATION_MINS, value
            ))
        })
}

fn parse_bool(value: &str) -> Result<bool, CliError> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        _ => Err(invalid(format!("Expected true or false, got '{}'", value))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::Database;

    fn create_test_app() -> App {
        App::with_db(Database::new_in_memory().unwrap())
    }

    fn exec(app: &mut App, args: &[&str]) -> Result<String, CliError> {
        let cli = Cli::try_parse_from(std::iter::once("serenefocus").chain(args.iter().copied()))
            .unwrap();
        let mut out = Vec::new();
        run(app, cli.command.unwrap(), &mut out)?;
        Ok(String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_no_subcommand_runs_tray() {
        let cli = Cli::try_parse_from(["serenefocus"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_task_add_and_list() {
        let mut app = create_test_app();
        let out = exec(&mut app, &["task", "add", "  Write report  "]).unwrap();
        assert!(out.starts_with("Task added"));
        exec(&mut app, &["task", "add", "buy milk"]).unwrap();

        let out = exec(&mut app, &["task", "list", "--sort", "alpha"]).unwrap();
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains("[ ] buy milk"));
        assert!(lines[1].contains("[ ] Write report"));
    }

    #[test]
    fn test_task_add_rejects_blank_title() {
        let mut app = create_test_app();
        let err = exec(&mut app, &["task", "add", "   "]).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));
        assert!(app.tasks.is_empty());
    }

    #[test]
    fn test_task_toggle_rename_delete() {
        let mut app = create_test_app();
        let id = app.add_task("Draft").unwrap();

        let out = exec(&mut app, &["task", "toggle", &id]).unwrap();
        assert!(out.contains("done"));
        exec(&mut app, &["task", "rename", &id, "Final draft"]).unwrap();
        assert_eq!(app.tasks.get(&id).unwrap().title, "Final draft");

        let err = exec(&mut app, &["task", "rename", &id, " "]).unwrap_err();
        assert!(matches!(err, CliError::InvalidInput(_)));

        exec(&mut app, &["task", "delete", &id]).unwrap();
        let err = exec(&mut app, &["task", "delete", &id]).unwrap_err();
        assert!(matches!(err, CliError::UnknownTask(_)));
        assert!(app.db.load_tasks().is_empty());
    }

    #[test]
    fn test_task_move() {
        let mut app = create_test_app();
        for title in ["a", "b", "c"] {
            app.add_task(title).unwrap();
        }

        exec(&mut app, &["task", "move", "3", "1"]).unwrap();
        let titles: Vec<_> = app.tasks.as_slice().iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, ["c", "a", "b"]);

        assert!(exec(&mut app, &["task", "move", "0", "1"]).is_err());
        assert!(exec(&mut app, &["task", "move", "1", "9"]).is_err());
    }

    #[test]
    fn test_stats_output() {
        let mut app = create_test_app();
        app.stats.record_session(today(), 25);

        let out = exec(&mut app, &["stats", "--days", "3"]).unwrap();
        assert!(out.starts_with("Streak: 1 day\n"));
        assert!(out.contains(&format!("{}   1 sessions    25 min", today())));
        assert!(out.contains("All time: 1 sessions, 25 min"));
    }

    #[test]
    fn test_settings_set_duration() {
        let mut app = create_test_app();
        exec(&mut app, &["settings", "set", "focusDuration", "50"]).unwrap();
        assert_eq!(app.settings.focus_duration, 50);
        assert_eq!(app.state.remaining_secs(), 50 * 60);

        for bad in ["abc", "0", "-5", "1441", "100000000"] {
            let err = exec(&mut app, &["settings", "set", "focusDuration", bad]).unwrap_err();
            assert!(matches!(err, CliError::InvalidInput(_)));
        }
        assert_eq!(app.db.load_settings().focus_duration, 50);
    }

    #[test]
    fn test_settings_set_flags_and_choices() {
        let mut app = create_test_app();
        exec(&mut app, &["settings", "set", "autoStartBreaks", "on"]).unwrap();
        exec(&mut app, &["settings", "set", "darkMode", "true"]).unwrap();
        exec(&mut app, &["settings", "set", "soundscape", "fire"]).unwrap();
        exec(&mut app, &["settings", "set", "soundscapeVolume", "80"]).unwrap();
        exec(&mut app, &["settings", "set", "theme", "lavender"]).unwrap();

        let s = app.db.load_settings();
        assert!(s.auto_start_breaks);
        assert!(s.dark_mode);
        assert_eq!(s.soundscape, Soundscape::Fire);
        assert_eq!(s.soundscape_volume, 80);
        assert_eq!(s.theme, Theme::Lavender);

        assert!(exec(&mut app, &["settings", "set", "soundscapeVolume", "101"]).is_err());
        assert!(exec(&mut app, &["settings", "set", "soundscape", "thunder"]).is_err());
        assert!(exec(&mut app, &["settings", "set", "darkMode", "maybe"]).is_err());
        assert!(exec(&mut app, &["settings", "set", "colour", "red"]).is_err());
    }

    #[test]
    fn test_settings_set_theme() {
        let mut app = create_test_app();
        exec(&mut app, &["settings", "set", "theme", "ocean"]).unwrap();
        assert_eq!(app.db.load_settings().theme, Theme::Ocean);

        let err = exec(&mut app, &["settings", "set", "theme", "neon"]).unwrap_err();
        assert!(err.to_string().contains("rose, ocean, forest, lavender"));
        assert_eq!(app.settings.theme, Theme::Ocean);
    }

    #[test]
    fn test_settings_show_uses_stored_names() {
        let mut app = create_test_app();
        let out = exec(&mut app, &["settings", "show"]).unwrap();
        assert!(out.contains("\"focusDuration\": 25"));
        assert!(out.contains("\"soundscape\": \"none\""));
    }
}
