use std::borrow::Cow;

use inksac::prelude::*;
use rustyline::{
    completion::Completer,
    highlight::{CmdKind, Highlighter},
    hint::Hinter,
    validate::Validator,
    Helper,
};

#[derive(Debug, Clone, Copy)]
pub struct SyntaxHighlighter {
    color_support: ColorSupport,
}

impl Default for SyntaxHighlighter {
    fn default() -> Self {
        Self::new()
    }
}

impl SyntaxHighlighter {
    pub fn new() -> Self {
        let support = check_color_support().unwrap_or(ColorSupport::NoColor);
        Self {
            color_support: support,
        }
    }

    pub fn without_color() -> Self {
        Self {
            color_support: ColorSupport::NoColor,
        }
    }

    /// Colours the program name, redirection operators and a trailing `&`.
    /// Spacing is preserved so the cursor position stays correct.
    pub fn highlight_command(&self, input: &str) -> String {
        if matches!(self.color_support, ColorSupport::NoColor) {
            return input.to_string();
        }

        let mut seen_program = false;
        let tokens: Vec<String> = input
            .split(' ')
            .map(|token| match token {
                "" => String::new(),
                "<" | ">" | "&" => {
                    let operator_style = Style::builder().foreground(Color::Yellow).build();
                    token.style(operator_style).to_string()
                }
                _ if !seen_program && !token.starts_with('#') => {
                    seen_program = true;
                    let command_style = Style::builder().foreground(Color::Cyan).bold().build();
                    token.style(command_style).to_string()
                }
                _ => {
                    seen_program = true;
                    token.to_string()
                }
            })
            .collect();

        tokens.join(" ")
    }
}

/// rustyline helper: highlighting only, no completion or hints.
#[derive(Clone, Default)]
pub struct LineHelper {
    highlighter: SyntaxHighlighter,
}

impl LineHelper {
    pub fn new() -> Self {
        Self {
            highlighter: SyntaxHighlighter::new(),
        }
    }
}

impl Helper for LineHelper {}

impl Highlighter for LineHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Owned(self.highlighter.highlight_command(line))
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        true
    }
}

impl Hinter for LineHelper {
    type Hint = String;
}

impl Validator for LineHelper {}

impl Completer for LineHelper {
    type Candidate = String;
}
