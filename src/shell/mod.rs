use signal_hook::low_level;

mod executor;
pub mod invocation;
pub mod line;

pub use invocation::{Invocation, ParseError, Redirect};
pub use line::Line;

use crate::{
    core::{
        commands::{Builtins, Flow},
        config::{Config, ConfigPaths},
        ShellState,
    },
    error::ShellError,
    flags::Flags,
    input::{self, LineSource, ReadOutcome},
    process::{signal, Launcher},
};

use executor::CommandHandler;

pub struct Shell {
    pub(crate) config: Config,
    pub(crate) paths: ConfigPaths,
    pub(crate) flags: Flags,
    pub(crate) state: ShellState,
    pub(crate) builtins: Builtins,
    pub(crate) launcher: Launcher,
    /// Substituted for `$$`.
    pub(crate) pid: u32,
}

impl Shell {
    pub fn new(flags: Flags) -> Result<Self, ShellError> {
        let paths = ConfigPaths::new(flags.get_value("config").map(String::as_str))?;
        let config = Config::load(&paths)?;
        Ok(Self::with_config(flags, config, paths))
    }

    pub fn with_config(flags: Flags, config: Config, paths: ConfigPaths) -> Self {
        let launcher = Launcher::new(config.background_report_delay);
        Shell {
            config,
            paths,
            flags,
            state: ShellState::new(),
            builtins: Builtins::new(),
            launcher,
            pid: std::process::id(),
        }
    }

    pub fn state(&self) -> &ShellState {
        &self.state
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Installs signal handling, picks an input source and runs until `exit`
    /// or end of input.
    pub fn run(&mut self) -> Result<(), ShellError> {
        signal::ignore_interrupts()?;
        let mode_signal = self.state.mode.install()?;

        let history_path = self
            .config
            .history_file
            .clone()
            .unwrap_or_else(|| self.paths.history_path.clone());
        let quiet = self.flags.is_set("quiet");
        let mut source = input::open(Some(history_path), self.config.history_size, quiet)?;

        let result = self.run_loop(source.as_mut());
        source.finish();
        low_level::unregister(mode_signal);
        result
    }

    /// The read-eval loop: reap, prompt, read, dispatch.
    pub fn run_loop(&mut self, source: &mut dyn LineSource) -> Result<(), ShellError> {
        loop {
            self.report_finished_jobs()?;

            let outcome = match source.read_line(&self.config.prompt) {
                Ok(outcome) => outcome,
                Err(e) => {
                    self.state.jobs.terminate_all();
                    return Err(e);
                }
            };

            match outcome {
                ReadOutcome::Line(line) => match self.execute_line(&line) {
                    Ok(Flow::Continue) => {}
                    Ok(Flow::Exit) => break,
                    Err(e) if e.is_fatal() => {
                        self.state.jobs.terminate_all();
                        return Err(e);
                    }
                    Err(e) => eprintln!("{}", e),
                },
                ReadOutcome::Interrupted => continue,
                ReadOutcome::Eof => {
                    if !self.flags.is_set("quiet") {
                        println!("exit");
                    }
                    self.state.jobs.terminate_all();
                    break;
                }
            }
        }
        Ok(())
    }

    fn report_finished_jobs(&mut self) -> Result<(), ShellError> {
        for completion in self.state.jobs.reap_finished()? {
            println!("{}", completion);
        }
        Ok(())
    }
}
