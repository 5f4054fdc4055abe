use std::path::PathBuf;
use std::str::FromStr;

use log::LevelFilter;

use crate::result_view::Locale;

pub const LOCALE_VAR: &str = "OFFICE_STATS_LOCALE";
pub const LOG_LEVEL_VAR: &str = "OFFICE_STATS_LOG_LEVEL";
pub const LOG_FILE_VAR: &str = "OFFICE_STATS_LOG_FILE";

/// Runtime settings, read from the environment at startup
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub locale: Locale,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
    /// Problems found while reading settings. Logged once logging is up.
    pub warnings: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            log_level: LevelFilter::Info,
            log_file: None,
            warnings: Vec::new(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the settings from any key lookup. Invalid values fall back to
    /// the defaults and leave a warning behind.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(tag) = non_empty(lookup(LOCALE_VAR)) {
            match Locale::from_tag(&tag) {
                Some(locale) => config.locale = locale,
                None => config
                    .warnings
                    .push(format!("Unknown {} '{}', using {:?}", LOCALE_VAR, tag, config.locale)),
            }
        }

        if let Some(level) = non_empty(lookup(LOG_LEVEL_VAR)) {
            match LevelFilter::from_str(&level) {
                Ok(level) => config.log_level = level,
                Err(_) => config.warnings.push(format!(
                    "Unknown {} '{}', using {}",
                    LOG_LEVEL_VAR, level, config.log_level
                )),
            }
        }

        config.log_file = non_empty(lookup(LOG_FILE_VAR)).map(PathBuf::from);

        config
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
