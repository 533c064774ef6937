use std::collections::BTreeMap;
use std::path::PathBuf;

mod builtin;
mod cd;

pub use builtin::{ExitCommand, StatusCommand};
pub use cd::CdCommand;

use crate::core::ShellState;

#[derive(Debug)]
pub enum CommandError {
    NotFound(String),
    HomeDirNotFound,
    ChangeDirectory { path: PathBuf, source: std::io::Error },
}

impl std::fmt::Display for CommandError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandError::NotFound(cmd) => write!(f, "not a built-in command: {}", cmd),
            CommandError::HomeDirNotFound => write!(f, "cd: HOME not set"),
            CommandError::ChangeDirectory { path, source } => {
                write!(f, "cd: {}: {}", path.display(), source)
            }
        }
    }
}

impl std::error::Error for CommandError {}

/// What the read-eval loop does after a built-in returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// A command that runs inside the interpreter process.
pub trait Command {
    fn execute(&self, args: &[String], state: &mut ShellState) -> Result<Flow, CommandError>;
}

#[derive(Clone, Debug)]
enum CommandType {
    Cd(CdCommand),
    Exit(ExitCommand),
    Status(StatusCommand),
}

impl Command for CommandType {
    fn execute(&self, args: &[String], state: &mut ShellState) -> Result<Flow, CommandError> {
        match self {
            CommandType::Cd(cmd) => cmd.execute(args, state),
            CommandType::Exit(cmd) => cmd.execute(args, state),
            CommandType::Status(cmd) => cmd.execute(args, state),
        }
    }
}

/// Name lookup for the built-ins `cd`, `exit` and `status`.
#[derive(Clone, Debug)]
pub struct Builtins {
    commands: BTreeMap<&'static str, CommandType>,
}

impl Default for Builtins {
    fn default() -> Self {
        Self::new()
    }
}

impl Builtins {
    pub fn new() -> Self {
        let mut commands = BTreeMap::new();
        commands.insert("cd", CommandType::Cd(CdCommand::new()));
        commands.insert("exit", CommandType::Exit(ExitCommand::new()));
        commands.insert("status", CommandType::Status(StatusCommand::new()));
        Self { commands }
    }

    pub fn is_builtin(&self, command: &str) -> bool {
        self.commands.contains_key(command)
    }

    /// `args` excludes the command name.
    pub fn execute(
        &self,
        command: &str,
        args: &[String],
        state: &mut ShellState,
    ) -> Result<Flow, CommandError> {
        let cmd = self
            .commands
            .get(command)
            .ok_or_else(|| CommandError::NotFound(command.to_string()))?;
        tracing::debug!(command, ?args, "built-in");
        cmd.execute(args, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::process::Termination;

    #[test]
    fn test_builtin_command_detection() {
        let builtins = Builtins::new();

        assert!(builtins.is_builtin("cd"));
        assert!(builtins.is_builtin("exit"));
        assert!(builtins.is_builtin("status"));
        assert!(!builtins.is_builtin("ls"));
        assert!(!builtins.is_builtin(""));
    }

    #[test]
    fn test_execute_unknown_command() {
        let builtins = Builtins::new();
        let mut state = ShellState::new();

        let result = builtins.execute("unknown_command", &[], &mut state);
        assert!(matches!(result, Err(CommandError::NotFound(_))));
    }

    #[test]
    fn test_status_continues() {
        let builtins = Builtins::new();
        let mut state = ShellState::new();
        state.record_foreground(Termination::Exited(3));

        let flow = builtins.execute("status", &[], &mut state).unwrap();
        assert_eq!(flow, Flow::Continue);
        assert_eq!(state.last_status(), Termination::Exited(3));
    }

    #[test]
    fn test_exit_stops_the_loop() {
        let builtins = Builtins::new();
        let mut state = ShellState::new();

        let flow = builtins.execute("exit", &[], &mut state).unwrap();
        assert_eq!(flow, Flow::Exit);
    }

    #[test]
    fn test_command_error_display() {
        let errors = vec![
            CommandError::NotFound("test".to_string()),
            CommandError::HomeDirNotFound,
            CommandError::ChangeDirectory {
                path: PathBuf::from("/nope"),
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            },
        ];

        for error in errors {
            assert!(!error.to_string().is_empty());
        }
    }
}
