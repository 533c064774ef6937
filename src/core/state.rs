use crate::process::{JobRegistry, ModeController, Termination};

/// Interpreter-wide state shared by the built-ins and the launcher.
#[derive(Debug, Default)]
pub struct ShellState {
    pub mode: ModeController,
    pub jobs: JobRegistry,
    last_status: Termination,
}

impl ShellState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Status of the most recent foreground command.
    pub fn last_status(&self) -> Termination {
        self.last_status
    }

    pub fn record_foreground(&mut self, status: Termination) {
        self.last_status = status;
    }
}
