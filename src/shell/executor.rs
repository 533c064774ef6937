use std::thread;

use super::invocation::Invocation;
use super::line::{self, Line};
use crate::core::commands::Flow;
use crate::error::ShellError;
use crate::process::{ProcessError, Termination};

pub(crate) trait CommandHandler {
    fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError>;
    fn launch(&mut self, invocation: &Invocation) -> Result<Flow, ShellError>;
}

impl CommandHandler for super::Shell {
    fn execute_line(&mut self, line: &str) -> Result<Flow, ShellError> {
        let (text, background) = match line::preprocess(line, self.pid) {
            Line::Empty => return Ok(Flow::Continue),
            Line::Command { text, background } => (text, background),
        };

        let invocation = Invocation::parse(&text, background, self.config.max_arguments)?;

        // Built-ins ignore redirection and `&`.
        if self.builtins.is_builtin(&invocation.program) {
            let flow = self.builtins.execute(
                &invocation.program,
                invocation.arguments(),
                &mut self.state,
            )?;
            return Ok(flow);
        }

        self.launch(&invocation)
    }

    fn launch(&mut self, invocation: &Invocation) -> Result<Flow, ShellError> {
        // The mode flag is read once, here; a SIGTSTP after this point
        // applies to the next command.
        let background = invocation.background && !self.state.mode.is_foreground_only();
        if invocation.background && !background {
            tracing::debug!(%invocation, "foreground-only mode, ignoring &");
        }

        let child = match self.launcher.spawn(invocation, background) {
            Ok(child) => child,
            Err(e @ ProcessError::Exec { .. }) => {
                if !background {
                    self.state.record_foreground(Termination::Exited(1));
                }
                return Err(e.into());
            }
            Err(e) => return Err(e.into()),
        };

        if background {
            let pid = self.state.jobs.insert(child, invocation.to_string());
            thread::sleep(self.launcher.report_delay());
            println!("background pid is {}", pid);
        } else {
            let status = self.launcher.wait(child)?;
            if let Termination::Signaled(_) = status {
                println!("{}", status);
            }
            self.state.record_foreground(status);
        }

        Ok(Flow::Continue)
    }
}
