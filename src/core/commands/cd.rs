use super::{Command, CommandError, Flow};
use crate::core::ShellState;
use crate::path::PathExpander;
use std::env;

#[derive(Clone, Debug)]
pub struct CdCommand {
    path_expander: PathExpander,
}

impl Default for CdCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl CdCommand {
    pub fn new() -> Self {
        Self {
            path_expander: PathExpander::new(),
        }
    }
}

impl Command for CdCommand {
    fn execute(&self, args: &[String], _state: &mut ShellState) -> Result<Flow, CommandError> {
        let target = match args.first() {
            Some(path) => self.path_expander.expand(path),
            None => self.path_expander.home_dir(),
        }
        .ok_or(CommandError::HomeDirNotFound)?;

        env::set_current_dir(&target).map_err(|source| CommandError::ChangeDirectory {
            path: target.clone(),
            source,
        })?;
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // One test so nothing else races on the process working directory.
    #[test]
    fn test_cd() {
        let cmd = CdCommand::new();
        let mut state = ShellState::new();
        let original = env::current_dir().unwrap();

        let temp_dir = env::temp_dir().canonicalize().unwrap();
        let flow = cmd
            .execute(&[temp_dir.to_str().unwrap().to_string()], &mut state)
            .unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(env::current_dir().unwrap(), temp_dir);

        let result = cmd.execute(&["/nonexistent/path".to_string()], &mut state);
        assert!(matches!(result, Err(CommandError::ChangeDirectory { .. })));
        assert_eq!(env::current_dir().unwrap(), temp_dir);

        if let Some(home) = PathExpander::new().home_dir().filter(|h| h.is_dir()) {
            assert!(cmd.execute(&[], &mut state).is_ok());
            assert_eq!(
                env::current_dir().unwrap(),
                home.canonicalize().unwrap()
            );
        }

        env::set_current_dir(original).unwrap();
    }
}
