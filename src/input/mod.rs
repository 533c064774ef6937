use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;

use rustyline::{config::Configurer, error::ReadlineError, history::FileHistory, Editor};

mod highlight;

pub use highlight::{LineHelper, SyntaxHighlighter};

use crate::error::ShellError;

/// Result of one prompt cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadOutcome {
    Line(String),
    /// Ctrl-C at the prompt; the partial line is dropped.
    Interrupted,
    Eof,
}

/// Where the read-eval loop gets its lines from.
pub trait LineSource {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError>;

    /// Called once when the loop ends.
    fn finish(&mut self) {}
}

/// Line editor used when stdin is a terminal.
pub struct EditorInput {
    editor: Editor<LineHelper, FileHistory>,
    history_path: Option<PathBuf>,
    quiet: bool,
}

impl EditorInput {
    pub fn new(
        history_path: Option<PathBuf>,
        history_size: usize,
        quiet: bool,
    ) -> Result<Self, ShellError> {
        let mut editor = Editor::<LineHelper, FileHistory>::new()?;
        editor.set_helper(Some(LineHelper::new()));
        editor.set_auto_add_history(true);
        editor.set_max_history_size(history_size)?;

        if let Some(path) = &history_path {
            if path.exists() {
                if let Err(e) = editor.load_history(path) {
                    if !quiet {
                        eprintln!("Warning: Couldn't load history: {}", e);
                    }
                }
            }
        }

        Ok(Self {
            editor,
            history_path,
            quiet,
        })
    }
}

impl LineSource for EditorInput {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError> {
        match self.editor.readline(prompt) {
            Ok(line) => Ok(ReadOutcome::Line(line)),
            Err(ReadlineError::Interrupted) => Ok(ReadOutcome::Interrupted),
            Err(ReadlineError::Eof) => Ok(ReadOutcome::Eof),
            Err(e) => Err(e.into()),
        }
    }

    fn finish(&mut self) {
        if let Some(path) = &self.history_path {
            if let Err(e) = self.editor.save_history(path) {
                if !self.quiet {
                    eprintln!("Warning: Couldn't save history: {}", e);
                }
            }
        }
    }
}

/// Plain reader for pipes and files: writes the prompt, flushes, reads one
/// line.
pub struct PipedInput<R> {
    reader: R,
}

impl<R: BufRead> PipedInput<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for PipedInput<R> {
    fn read_line(&mut self, prompt: &str) -> Result<ReadOutcome, ShellError> {
        let mut stdout = io::stdout().lock();
        stdout.write_all(prompt.as_bytes())?;
        stdout.flush()?;
        drop(stdout);

        // Bytes that are not UTF-8 become U+FFFD instead of ending the session.
        let mut raw = Vec::new();
        if self.reader.read_until(b'\n', &mut raw)? == 0 {
            return Ok(ReadOutcome::Eof);
        }
        Ok(ReadOutcome::Line(String::from_utf8_lossy(&raw).into_owned()))
    }
}

/// Picks the editor for a terminal and the plain reader otherwise.
pub fn open(
    history_path: Option<PathBuf>,
    history_size: usize,
    quiet: bool,
) -> Result<Box<dyn LineSource>, ShellError> {
    if io::stdin().is_terminal() && io::stdout().is_terminal() {
        tracing::debug!("interactive terminal, using line editor");
        Ok(Box::new(EditorInput::new(history_path, history_size, quiet)?))
    } else {
        tracing::debug!("stdin is not a terminal, reading plain lines");
        Ok(Box::new(PipedInput::new(io::stdin().lock())))
    }
}
