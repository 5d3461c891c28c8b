use crate::error::ConfigError;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

const APP_DIR_NAME: &str = "calendar-journal";

/// Which of the two journal variants to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalMode {
    Diary,
    Interview,
}

impl FromStr for JournalMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "diary" => Ok(JournalMode::Diary),
            "interview" => Ok(JournalMode::Interview),
            _ => Err(ConfigError::UnknownMode(s.to_string())),
        }
    }
}

impl fmt::Display for JournalMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JournalMode::Diary => write!(f, "diary"),
            JournalMode::Interview => write!(f, "interview"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `JOURNAL_MODE`: `diary` (default) or `interview`.
    pub mode: JournalMode,
    /// `JOURNAL_DATA_DIR`: where the store and the log file live.
    pub data_dir: PathBuf,
    /// `JOURNAL_EXPORT_DIR`: where exports are written.
    pub export_dir: PathBuf,
    /// `JOURNAL_LOG_LEVEL`: a tracing filter directive, `info` by default.
    pub log_level: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mode = match lookup("JOURNAL_MODE") {
            Some(value) => value.parse()?,
            None => JournalMode::Diary,
        };

        let data_dir = lookup("JOURNAL_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);

        let export_dir = lookup("JOURNAL_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let log_level = lookup("JOURNAL_LOG_LEVEL").unwrap_or_else(|| "info".to_string());

        Ok(Config {
            mode,
            data_dir,
            export_dir,
            log_level,
        })
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_to_diary_mode() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.mode, JournalMode::Diary);
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert_eq!(config.log_level, "info");
        assert!(config.data_dir.ends_with(APP_DIR_NAME) || config.data_dir.ends_with("data"));
    }

    #[test]
    fn reads_every_variable() {
        let config = config_from(&[
            ("JOURNAL_MODE", "Interview"),
            ("JOURNAL_DATA_DIR", "/tmp/journal"),
            ("JOURNAL_EXPORT_DIR", "/tmp/out"),
            ("JOURNAL_LOG_LEVEL", "debug"),
        ])
        .unwrap();
        assert_eq!(config.mode, JournalMode::Interview);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/journal"));
        assert_eq!(config.export_dir, PathBuf::from("/tmp/out"));
        assert_eq!(config.log_level, "debug");
    }

    #[test]
    fn unknown_mode_is_an_error() {
        assert_eq!(
            config_from(&[("JOURNAL_MODE", "ledger")]),
            Err(ConfigError::UnknownMode("ledger".to_string()))
        );
    }
}
