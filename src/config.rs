//! Process configuration: where SereneFocus keeps its files.

use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "SERENEFOCUS_DATA_DIR";

const DB_FILE: &str = "serenefocus.db";
const SOUNDSCAPE_DIR: &str = "soundscapes";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub data_dir: PathBuf,
}

impl Config {
    /// Resolves the data directory from the environment, then the platform
    /// data dir, then the working directory.
    pub fn from_env() -> Self {
        let data_dir = std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                ProjectDirs::from("com", "serenefocus", "SereneFocus")
                    .map(|dirs| dirs.data_dir().to_path_buf())
            })
            .unwrap_or_else(|| PathBuf::from("."));
        Self::with_data_dir(data_dir)
    }

    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
        }
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE)
    }

    /// Directory holding `<id>.ogg` loops for each soundscape.
    pub fn soundscape_dir(&self) -> PathBuf {
        self.data_dir.join(SOUNDSCAPE_DIR)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paths_are_inside_data_dir() {
        let config = Config::with_data_dir("/tmp/serene");
        assert_eq!(config.db_path(), PathBuf::from("/tmp/serene/serenefocus.db"));
        assert_eq!(
            config.soundscape_dir(),
            PathBuf::from("/tmp/serene/soundscapes")
        );
    }
}
