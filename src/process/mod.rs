use std::fmt;
use std::io;
use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;

pub mod jobs;
pub mod launcher;
pub mod signal;

pub use jobs::{BackgroundJob, Completion, JobRegistry};
pub use launcher::Launcher;
pub use signal::{Mode, ModeController};

/// How a child process ended, as reported by `status` and job notices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
}

impl Default for Termination {
    fn default() -> Self {
        Termination::Exited(0)
    }
}

impl From<ExitStatus> for Termination {
    fn from(status: ExitStatus) -> Self {
        match (status.code(), status.signal()) {
            (Some(code), _) => Termination::Exited(code),
            (None, Some(signal)) => Termination::Signaled(signal),
            (None, None) => Termination::Exited(1),
        }
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Termination::Exited(code) => write!(f, "exit value {}", code),
            Termination::Signaled(signal) => write!(f, "terminated by signal {}", signal),
        }
    }
}

#[derive(Debug)]
pub enum ProcessError {
    /// The OS refused to create a process.
    Spawn(io::Error),
    /// Setting up the child failed for this command only.
    Exec { program: String, source: io::Error },
    InvalidArgument(String),
    Wait { pid: u32, source: io::Error },
    Reap { pid: u32, source: io::Error },
    SignalError(String),
}

impl ProcessError {
    /// Whether the interpreter itself has to stop.
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            ProcessError::Exec { .. } | ProcessError::InvalidArgument(_)
        )
    }
}

impl fmt::Display for ProcessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProcessError::Spawn(e) => write!(f, "cannot create process: {}", e),
            ProcessError::Exec { program, source } => write!(f, "{}: {}", program, source),
            ProcessError::InvalidArgument(msg) => write!(f, "invalid argument: {}", msg),
            ProcessError::Wait { pid, source } => write!(f, "wait for pid {} failed: {}", pid, source),
            ProcessError::Reap { pid, source } => {
                write!(f, "checking background pid {} failed: {}", pid, source)
            }
            ProcessError::SignalError(msg) => write!(f, "signal error: {}", msg),
        }
    }
}

impl std::error::Error for ProcessError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ProcessError::Spawn(e)
            | ProcessError::Exec { source: e, .. }
            | ProcessError::Wait { source: e, .. }
            | ProcessError::Reap { source: e, .. } => Some(e),
            _ => None,
        }
    }
}
