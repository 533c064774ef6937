use super::{Command, CommandError, Flow};
use crate::core::ShellState;

/// Terminates outstanding background jobs and ends the loop.
#[derive(Clone, Debug)]
pub struct ExitCommand;

impl Default for ExitCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl ExitCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for ExitCommand {
    fn execute(&self, _args: &[String], state: &mut ShellState) -> Result<Flow, CommandError> {
        let signalled = state.jobs.terminate_all();
        tracing::debug!(signalled, "exit");
        Ok(Flow::Exit)
    }
}

/// Prints how the last foreground command ended.
#[derive(Clone, Debug)]
pub struct StatusCommand;

impl Default for StatusCommand {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusCommand {
    pub fn new() -> Self {
        Self
    }
}

impl Command for StatusCommand {
    fn execute(&self, _args: &[String], state: &mut ShellState) -> Result<Flow, CommandError> {
        println!("{}", state.last_status());
        Ok(Flow::Continue)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::{Command as Process, Stdio};

    #[test]
    fn test_exit_command_terminates_jobs() {
        let cmd = ExitCommand::new();
        let mut state = ShellState::new();
        let child = Process::new("sleep")
            .arg("30")
            .stdout(Stdio::null())
            .spawn()
            .unwrap();
        let pid = state.jobs.insert(child, "sleep 30");

        assert_eq!(cmd.execute(&[], &mut state).unwrap(), Flow::Exit);
        assert!(state.jobs.is_empty());

        let mut status = 0;
        unsafe {
            assert_eq!(libc::waitpid(pid as libc::pid_t, &mut status, 0), pid as libc::pid_t);
        }
        assert!(libc::WIFSIGNALED(status));
        assert_eq!(libc::WTERMSIG(status), libc::SIGTERM);
    }

    #[test]
    fn test_status_command() {
        let cmd = StatusCommand::new();
        let mut state = ShellState::new();
        assert_eq!(cmd.execute(&[], &mut state).unwrap(), Flow::Continue);
    }
}
