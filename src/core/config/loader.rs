use std::{env, fs, path::Path, time::Duration};

use super::{Config, ConfigError, ConfigPaths};
use crate::path::PathExpander;

pub struct ConfigLoader<'a> {
    paths: &'a ConfigPaths,
}

impl<'a> ConfigLoader<'a> {
    pub fn new(paths: &'a ConfigPaths) -> Self {
        Self { paths }
    }

    pub fn load_configs(&self, config: &mut Config) -> Result<(), ConfigError> {
        Self::source_if_exists(&self.paths.rc_path, config)
    }

    fn source_if_exists(path: &Path, config: &mut Config) -> Result<(), ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no rc file");
            return Ok(());
        }
        let content = fs::read_to_string(path)?;
        tracing::debug!(path = %path.display(), "loading rc file");
        Self::apply_str(&content, config)
    }

    pub fn apply_str(content: &str, config: &mut Config) -> Result<(), ConfigError> {
        for (index, line) in content.lines().enumerate() {
            Self::process_line(index + 1, line, config)?;
        }
        Ok(())
    }

    fn process_line(number: usize, line: &str, config: &mut Config) -> Result<(), ConfigError> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(());
        }

        if let Some(var_def) = line.strip_prefix("export ") {
            return Self::process_env_var(number, var_def);
        }

        match line.split_once('=') {
            Some((key, value)) => Self::process_setting(number, key.trim(), value.trim(), config),
            None => Err(ConfigError::InvalidLine {
                line: number,
                content: line.to_string(),
            }),
        }
    }

    fn process_env_var(number: usize, var_def: &str) -> Result<(), ConfigError> {
        let (name, value) = var_def
            .split_once('=')
            .filter(|(name, _)| !name.trim().is_empty())
            .ok_or_else(|| ConfigError::InvalidLine {
                line: number,
                content: format!("export {}", var_def),
            })?;

        let value = unquote(value.trim());
        env::set_var(name.trim(), expand_value(value));
        Ok(())
    }

    fn process_setting(
        number: usize,
        key: &str,
        value: &str,
        config: &mut Config,
    ) -> Result<(), ConfigError> {
        let invalid = || ConfigError::InvalidValue {
            line: number,
            key: key.to_string(),
            value: value.to_string(),
        };
        let value = unquote(value);

        match key {
            "prompt" => config.prompt = value.to_string(),
            "background_report_delay_ms" => {
                let millis: u64 = value.parse().map_err(|_| invalid())?;
                config.background_report_delay = Duration::from_millis(millis);
            }
            "max_arguments" => {
                config.max_arguments = value
                    .parse()
                    .ok()
                    .filter(|&max: &usize| max > 0)
                    .ok_or_else(invalid)?;
            }
            "history_size" => config.history_size = value.parse().map_err(|_| invalid())?,
            "history_file" => {
                config.history_file = Some(PathExpander::new().expand(value).ok_or_else(invalid)?);
            }
            _ => {
                return Err(ConfigError::UnknownKey {
                    line: number,
                    key: key.to_string(),
                })
            }
        }
        Ok(())
    }
}

fn unquote(value: &str) -> &str {
    if value.len() >= 2 && value.starts_with('"') && value.ends_with('"') {
        &value[1..value.len() - 1]
    } else {
        value
    }
}

/// Expands `$HOME` and `$PATH` in an exported value.
fn expand_value(value: &str) -> String {
    let mut result = value.to_string();
    for name in ["HOME", "PATH"] {
        let var = format!("${}", name);
        if result.contains(&var) {
            let current = env::var(name).unwrap_or_default();
            result = result.replace(&var, &current);
        }
    }
    result
}
