//! Markdown input acquisition.

use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::CliError;

/// File extensions accepted as markdown, compared case-insensitively.
const MARKDOWN_EXTENSIONS: &[&str] = &["md", "markdown", "mdown", "mkd", "mdx"];

/// Check whether a path has a markdown file extension.
pub(crate) fn is_markdown_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            MARKDOWN_EXTENSIONS
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// Where a command reads its markdown from.
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Input {
    Stdin,
    File(PathBuf),
}

impl Input {
    /// Resolve the positional input argument. `-` or no argument means stdin.
    ///
    /// # Errors
    ///
    /// Returns `CliError::Validation` for paths without a markdown extension.
    pub(crate) fn from_arg(arg: Option<PathBuf>) -> Result<Self, CliError> {
        match arg {
            None => Ok(Self::Stdin),
            Some(path) if path.as_os_str() == "-" => Ok(Self::Stdin),
            Some(path) => {
                if !is_markdown_file(&path) {
                    return Err(CliError::Validation(format!(
                        "{} is not a markdown file (expected one of: .{})",
                        path.display(),
                        MARKDOWN_EXTENSIONS.join(", .")
                    )));
                }
                Ok(Self::File(path))
            }
        }
    }

    /// Read the whole input as UTF-8 text.
    pub(crate) fn read(&self) -> Result<String, CliError> {
        let bytes = match self {
            Self::Stdin => {
                let mut buf = Vec::new();
                std::io::stdin().lock().read_to_end(&mut buf)?;
                buf
            }
            Self::File(path) => std::fs::read(path)?,
        };
        String::from_utf8(bytes)
            .map_err(|_| CliError::Validation(format!("{self} is not valid UTF-8")))
    }

    /// File name without extension, if reading from a file.
    pub(crate) fn stem(&self) -> Option<&str> {
        match self {
            Self::Stdin => None,
            Self::File(path) => path.file_stem().and_then(|s| s.to_str()),
        }
    }
}

impl std::fmt::Display for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdin => f.write_str("<stdin>"),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_is_markdown_file() {
        for name in ["a.md", "b.markdown", "c.mdown", "d.mkd", "e.mdx", "F.MD", "g.Markdown"] {
            assert!(is_markdown_file(Path::new(name)), "{name}");
        }
        for name in ["a.txt", "md", "a.md.bak", "a.html", ".md"] {
            assert!(!is_markdown_file(Path::new(name)), "{name}");
        }
    }

    #[test]
    fn test_from_arg() {
        assert_eq!(Input::from_arg(None).unwrap(), Input::Stdin);
        assert_eq!(Input::from_arg(Some(PathBuf::from("-"))).unwrap(), Input::Stdin);
        assert_eq!(
            Input::from_arg(Some(PathBuf::from("docs/readme.md"))).unwrap(),
            Input::File(PathBuf::from("docs/readme.md"))
        );
    }

    #[test]
    fn test_from_arg_rejects_other_extensions() {
        let err = Input::from_arg(Some(PathBuf::from("notes.txt"))).unwrap_err();
        assert!(matches!(err, CliError::Validation(_)));
        assert!(err.to_string().contains("notes.txt"));
    }

    #[test]
    fn test_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("doc.md");
        std::fs::write(&path, "# Hi").unwrap();

        let input = Input::File(path);
        assert_eq!(input.read().unwrap(), "# Hi");
        assert_eq!(input.stem(), Some("doc"));
    }

    #[test]
    fn test_read_rejects_invalid_utf8() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.md");
        std::fs::write(&path, [0x66, 0xff, 0xfe]).unwrap();

        let err = Input::File(path).read().unwrap_err();
        assert!(err.to_string().contains("not valid UTF-8"));
    }

    #[test]
    fn test_read_missing_file() {
        let err = Input::File(PathBuf::from("/nonexistent/doc.md"))
            .read()
            .unwrap_err();
        assert!(matches!(err, CliError::Io(_)));
    }

    #[test]
    fn test_stdin_has_no_stem() {
        assert_eq!(Input::Stdin.stem(), None);
        assert_eq!(Input::Stdin.to_string(), "<stdin>");
    }
}
