use std::env;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug)]
pub struct PathExpander;

impl Default for PathExpander {
    fn default() -> Self {
        Self::new()
    }
}

impl PathExpander {
    pub fn new() -> Self {
        Self
    }

    /// Expands a leading `~` or `~/`. Returns `None` only when the path needs
    /// the home directory and none is known.
    pub fn expand(&self, path: &str) -> Option<PathBuf> {
        if path.starts_with('~') {
            self.expand_tilde(path)
        } else {
            Some(Path::new(path).to_path_buf())
        }
    }

    fn expand_tilde(&self, path: &str) -> Option<PathBuf> {
        if path.len() == 1 {
            return self.home_dir();
        }

        let without_tilde = &path[1..];
        if let Some(stripped) = without_tilde.strip_prefix('/') {
            let mut home_path = self.home_dir()?;
            for part in stripped.split('/').filter(|part| !part.is_empty()) {
                home_path.push(part);
            }
            Some(home_path)
        } else {
            // "~user" is taken literally
            Some(Path::new(path).to_path_buf())
        }
    }

    /// `$HOME` when set and non-empty, otherwise the platform lookup.
    pub fn home_dir(&self) -> Option<PathBuf> {
        env::var_os("HOME")
            .filter(|home| !home.is_empty())
            .map(PathBuf::from)
            .or_else(dirs::home_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_path_is_untouched() {
        let expander = PathExpander::new();
        assert_eq!(expander.expand("/tmp"), Some(PathBuf::from("/tmp")));
        assert_eq!(expander.expand("rel/dir"), Some(PathBuf::from("rel/dir")));
    }

    #[test]
    fn test_tilde_expansion() {
        let expander = PathExpander::new();
        let Some(home) = expander.home_dir() else {
            return;
        };
        assert_eq!(expander.expand("~"), Some(home.clone()));
        assert_eq!(expander.expand("~/a//b"), Some(home.join("a").join("b")));
    }

    #[test]
    fn test_other_user_is_literal() {
        let expander = PathExpander::new();
        assert_eq!(expander.expand("~root"), Some(PathBuf::from("~root")));
    }
}
