use std::fmt;
use std::path::PathBuf;

/// Default ceiling on argv length, program name included.
pub const DEFAULT_MAX_ARGUMENTS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Redirect {
    Input,  // <
    Output, // >
}

impl Redirect {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "<" => Some(Redirect::Input),
            ">" => Some(Redirect::Output),
            _ => None,
        }
    }
}

impl fmt::Display for Redirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Redirect::Input => write!(f, "<"),
            Redirect::Output => write!(f, ">"),
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ParseError {
    Empty,
    MissingRedirectTarget(Redirect),
    TooManyArguments(usize),
    UnexpectedToken(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::Empty => write!(f, "syntax error: empty command"),
            ParseError::MissingRedirectTarget(redirect) => {
                write!(f, "syntax error: missing file name after '{}'", redirect)
            }
            ParseError::TooManyArguments(max) => {
                write!(f, "syntax error: more than {} arguments", max)
            }
            ParseError::UnexpectedToken(token) => {
                write!(f, "syntax error: unexpected '{}' after redirection", token)
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// One parsed command line, ready to dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    /// Full argv; `args[0]` is the program name.
    pub args: Vec<String>,
    pub input: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub background: bool,
}

impl Invocation {
    /// Parses a preprocessed line. Arguments come first; once a `<` or `>`
    /// token is seen only redirections may follow, in either order, and a
    /// repeated direction replaces the earlier target.
    pub fn parse(line: &str, background: bool, max_arguments: usize) -> Result<Self, ParseError> {
        let mut tokens = line.split_whitespace().peekable();
        let program = tokens.next().ok_or(ParseError::Empty)?;

        let mut args = vec![program.to_string()];
        while let Some(&token) = tokens.peek() {
            if Redirect::from_token(token).is_some() {
                break;
            }
            if args.len() >= max_arguments {
                return Err(ParseError::TooManyArguments(max_arguments));
            }
            args.push(token.to_string());
            tokens.next();
        }

        let mut input = None;
        let mut output = None;
        while let Some(token) = tokens.next() {
            let redirect = Redirect::from_token(token)
                .ok_or_else(|| ParseError::UnexpectedToken(token.to_string()))?;
            let target = tokens
                .next()
                .filter(|t| Redirect::from_token(t).is_none())
                .ok_or(ParseError::MissingRedirectTarget(redirect))?;

            match redirect {
                Redirect::Input => input = Some(PathBuf::from(target)),
                Redirect::Output => output = Some(PathBuf::from(target)),
            }
        }

        Ok(Invocation {
            program: program.to_string(),
            args,
            input,
            output,
            background,
        })
    }

    /// Arguments after the program name.
    pub fn arguments(&self) -> &[String] {
        self.args.get(1..).unwrap_or(&[])
    }
}

impl fmt::Display for Invocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.args.join(" "))?;
        if let Some(input) = &self.input {
            write!(f, " < {}", input.display())?;
        }
        if let Some(output) = &self.output {
            write!(f, " > {}", output.display())?;
        }
        if self.background {
            write!(f, " &")?;
        }
        Ok(())
    }
}
