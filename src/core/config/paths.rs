use super::ConfigError;
use crate::path::PathExpander;
use std::path::PathBuf;

const RC_FILE: &str = ".jobshrc";
const HISTORY_FILE: &str = ".jobsh_history";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    pub rc_path: PathBuf,
    pub history_path: PathBuf,
}

impl ConfigPaths {
    /// Paths under the home directory. `rc_override` (from `--config`)
    /// replaces the rc file location.
    pub fn new(rc_override: Option<&str>) -> Result<Self, ConfigError> {
        let expander = PathExpander::new();
        let home_path = expander.home_dir().ok_or(ConfigError::HomeDirNotFound)?;
        Ok(Self::in_dir(home_path, rc_override))
    }

    pub fn in_dir(home_path: PathBuf, rc_override: Option<&str>) -> Self {
        let rc_path = rc_override
            .and_then(|path| PathExpander::new().expand(path))
            .unwrap_or_else(|| home_path.join(RC_FILE));

        ConfigPaths {
            rc_path,
            history_path: home_path.join(HISTORY_FILE),
        }
    }
}
