use std::{fmt, path::PathBuf, time::Duration};

mod loader;
mod paths;

use loader::ConfigLoader;
pub use paths::ConfigPaths;

use crate::shell::invocation::DEFAULT_MAX_ARGUMENTS;

/// Runtime settings, from defaults overlaid with the rc file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub prompt: String,
    pub background_report_delay: Duration,
    pub max_arguments: usize,
    pub history_size: usize,
    /// Overrides the default history location when set.
    pub history_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            prompt: ": ".to_string(),
            background_report_delay: Duration::from_millis(1000),
            max_arguments: DEFAULT_MAX_ARGUMENTS,
            history_size: 1000,
            history_file: None,
        }
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults plus whatever the rc file at `paths.rc_path` sets.
    pub fn load(paths: &ConfigPaths) -> Result<Self, ConfigError> {
        let mut config = Config::new();
        ConfigLoader::new(paths).load_configs(&mut config)?;
        Ok(config)
    }

    /// Applies rc-file syntax from a string.
    pub fn apply(&mut self, content: &str) -> Result<(), ConfigError> {
        ConfigLoader::apply_str(content, self)
    }
}

#[derive(Debug)]
pub enum ConfigError {
    HomeDirNotFound,
    IoError(std::io::Error),
    InvalidLine { line: usize, content: String },
    UnknownKey { line: usize, key: String },
    InvalidValue { line: usize, key: String, value: String },
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::HomeDirNotFound => write!(f, "Home directory not found"),
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::InvalidLine { line, content } => {
                write!(f, "line {}: cannot parse '{}'", line, content)
            }
            ConfigError::UnknownKey { line, key } => {
                write!(f, "line {}: unknown setting '{}'", line, key)
            }
            ConfigError::InvalidValue { line, key, value } => {
                write!(f, "line {}: invalid value '{}' for '{}'", line, value, key)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::new();
        assert_eq!(config.prompt, ": ");
        assert_eq!(config.background_report_delay, Duration::from_secs(1));
        assert_eq!(config.max_arguments, 512);
        assert_eq!(config.history_file, None);
    }

    #[test]
    fn test_apply_overrides_defaults() {
        let mut config = Config::new();
        config
            .apply("background_report_delay_ms = 0\nmax_arguments = 8\n")
            .unwrap();
        assert_eq!(config.background_report_delay, Duration::ZERO);
        assert_eq!(config.max_arguments, 8);
        assert_eq!(config.prompt, ": ");
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::UnknownKey {
            line: 3,
            key: "colour".to_string(),
        };
        assert_eq!(err.to_string(), "line 3: unknown setting 'colour'");
    }
}
