//! SQLite-backed key-value store of JSON documents.
//!
//! Settings, the task list and the daily stats each live under their own key
//! as a single JSON blob. Reads never fail: an absent or unreadable document
//! yields its default.

use crate::models::{DailyStats, Settings, Task, BACKFILLED_SETTINGS_FIELDS};
use rusqlite::{Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

pub const SETTINGS_KEY: &str = "serene_settings";
pub const TASKS_KEY: &str = "serene_tasks";
pub const STATS_KEY: &str = "serene_stats";

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Failed to create database directory")]
    DirectoryCreation,
}

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (or creates) the database file, initializing tables if needed.
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|_| DatabaseError::DirectoryCreation)?;
        }

        let conn = Connection::open(path)?;
        Self::initialize_tables(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database (for testing).
    #[cfg(test)]
    pub fn new_in_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        Self::initialize_tables(&conn)?;
        Ok(Self { conn })
    }

    fn initialize_tables(conn: &Connection) -> Result<(), DatabaseError> {
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS documents (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );
        "#,
        )?;
        Ok(())
    }

    /// Returns the raw document stored under `key`.
    pub fn get(&self, key: &str) -> Result<Option<String>, DatabaseError> {
        let value = self
            .conn
            .query_row("SELECT value FROM documents WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Counter that moves whenever another connection commits to the file.
    /// Writes through this connection leave it unchanged.
    pub fn data_version(&self) -> Result<i64, DatabaseError> {
        let version = self
            .conn
            .query_row("PRAGMA data_version", [], |row| row.get(0))?;
        Ok(version)
    }

    /// Stores a raw document under `key`, replacing any previous value.
    pub fn set(&self, key: &str, value: &str) -> Result<(), DatabaseError> {
        self.conn.execute(
            "INSERT OR REPLACE INTO documents (key, value) VALUES (?, ?)",
            [key, value],
        )?;
        Ok(())
    }

    fn load_document<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.get(key) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(key, error = %e, "failed to read document, using default");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(doc) => Some(doc),
            Err(e) => {
                warn!(key, error = %e, "malformed document, using default");
                None
            }
        }
    }

    fn save_document<T: Serialize + ?Sized>(&self, key: &str, doc: &T) -> Result<(), DatabaseError> {
        let json = serde_json::to_string(doc)?;
        self.set(key, &json)
    }

    /// Loads settings, returning defaults if absent or corrupt.
    ///
    /// Documents written before the newer optional fields existed are
    /// completed with their defaults and written back once.
    pub fn load_settings(&self) -> Settings {
        let Some(value) = self.load_document::<serde_json::Value>(SETTINGS_KEY) else {
            return Settings::default();
        };

        let needs_backfill = value.as_object().is_some_and(|fields| {
            BACKFILLED_SETTINGS_FIELDS
                .iter()
                .any(|field| !fields.contains_key(*field))
        });

        let mut settings: Settings = match serde_json::from_value(value) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(error = %e, "malformed settings, using defaults");
                return Settings::default();
            }
        };
        settings.sanitize();

        if needs_backfill {
            info!("upgrading stored settings with new default fields");
            if let Err(e) = self.save_settings(&settings) {
                warn!(error = %e, "failed to write upgraded settings");
            }
        }

        settings
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<(), DatabaseError> {
        self.save_document(SETTINGS_KEY, settings)
    }

    /// Loads the task list, empty if absent or corrupt.
    pub fn load_tasks(&self) -> Vec<Task> {
        self.load_document(TASKS_KEY).unwrap_or_default()
    }

    pub fn save_tasks(&self, tasks: &[Task]) -> Result<(), DatabaseError> {
        self.save_document(TASKS_KEY, tasks)
    }

    /// Loads all daily stats, empty if absent or corrupt.
    pub fn load_stats(&self) -> Vec<DailyStats> {
        self.load_document(STATS_KEY).unwrap_or_default()
    }

    pub fn save_stats(&self, stats: &[DailyStats]) -> Result<(), DatabaseError> {
        self.save_document(STATS_KEY, stats)
    }
}
