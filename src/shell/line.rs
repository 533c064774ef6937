use std::borrow::Cow;

/// Two-character marker replaced by the interpreter's pid.
const PID_MARKER: &str = "$$";

/// A raw input line after newline stripping, background detection and `$$`
/// expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    /// Blank line or comment.
    Empty,
    Command { text: String, background: bool },
}

pub fn preprocess(raw: &str, pid: u32) -> Line {
    let line = strip_newline(raw);
    let (line, background) = split_background(line);
    let text = expand_pid(line, pid);

    let trimmed = text.trim_start();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Line::Empty;
    }

    Line::Command {
        text: text.into_owned(),
        background,
    }
}

fn strip_newline(raw: &str) -> &str {
    let line = raw.strip_suffix('\n').unwrap_or(raw);
    line.strip_suffix('\r').unwrap_or(line)
}

/// Splits off a trailing `&` that is preceded by whitespace.
fn split_background(line: &str) -> (&str, bool) {
    if let Some(rest) = line.strip_suffix('&') {
        if let Some(ws) = rest.chars().next_back().filter(|c| c.is_whitespace()) {
            return (&rest[..rest.len() - ws.len_utf8()], true);
        }
    }
    (line, false)
}

/// Replaces every `$$` with `pid`, left to right and non-overlapping, so a
/// run of three dollars leaves one literal `$` behind.
pub fn expand_pid(input: &str, pid: u32) -> Cow<'_, str> {
    let count = input.matches(PID_MARKER).count();
    if count == 0 {
        return Cow::Borrowed(input);
    }

    let pid = pid.to_string();
    let mut expanded =
        String::with_capacity(input.len() - count * PID_MARKER.len() + count * pid.len());
    let mut last = 0;
    for (index, _) in input.match_indices(PID_MARKER) {
        expanded.push_str(&input[last..index]);
        expanded.push_str(&pid);
        last = index + PID_MARKER.len();
    }
    expanded.push_str(&input[last..]);

    Cow::Owned(expanded)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn command(text: &str, background: bool) -> Line {
        Line::Command {
            text: text.to_string(),
            background,
        }
    }

    #[test]
    fn test_expand_every_marker() {
        assert_eq!(expand_pid("echo $$ $$", 42), "echo 42 42");
        assert_eq!(expand_pid("a$$b$$c$$", 7), "a7b7c7");
        assert_eq!(expand_pid("x$$$$", 12), "x1212");
    }

    #[test]
    fn test_expand_three_dollars_leaves_one() {
        assert_eq!(expand_pid("$$$", 99), "99$");
        assert_eq!(expand_pid("echo $$$$$", 5), "echo 55$");
    }

    #[test]
    fn test_expand_without_marker_borrows() {
        let expanded = expand_pid("echo $HOME $", 1);
        assert!(matches!(expanded, Cow::Borrowed(_)));
        assert_eq!(expanded, "echo $HOME $");
    }

    #[test]
    fn test_blank_and_comment_lines() {
        assert_eq!(preprocess("\n", 1), Line::Empty);
        assert_eq!(preprocess("", 1), Line::Empty);
        assert_eq!(preprocess("   \t  \n", 1), Line::Empty);
        assert_eq!(preprocess("# comment\n", 1), Line::Empty);
        assert_eq!(preprocess("   # indented comment", 1), Line::Empty);
        assert_eq!(preprocess(" &\n", 1), Line::Empty);
    }

    #[test]
    fn test_newline_is_stripped() {
        assert_eq!(preprocess("ls -la\n", 1), command("ls -la", false));
        assert_eq!(preprocess("ls\r\n", 1), command("ls", false));
    }

    #[test]
    fn test_trailing_ampersand_marks_background() {
        assert_eq!(preprocess("sleep 5 &\n", 1), command("sleep 5", true));
        assert_eq!(preprocess("sleep 5\t&", 1), command("sleep 5", true));
    }

    #[test]
    fn test_ampersand_without_space_is_literal() {
        assert_eq!(preprocess("echo a&\n", 1), command("echo a&", false));
        assert_eq!(preprocess("echo & done", 1), command("echo & done", false));
        assert_eq!(preprocess("&", 1), command("&", false));
    }

    #[test]
    fn test_expansion_happens_with_background() {
        assert_eq!(
            preprocess("echo $$ > out.$$ &\n", 314),
            command("echo 314 > out.314", true)
        );
    }
}
