//! Terminal output utilities.
//!
//! Status messages go to stderr with colors; command results go to stdout
//! or a file, uncolored.

use std::io::Write;
use std::path::Path;

use console::{Style, Term};

use crate::error::CliError;

/// Terminal output formatter.
pub(crate) struct Output {
    term: Term,
    green: Style,
    red: Style,
}

impl Output {
    /// Create a new output formatter.
    #[must_use]
    pub(crate) fn new() -> Self {
        Self {
            term: Term::stderr(),
            green: Style::new().green(),
            red: Style::new().red(),
        }
    }

    /// Print a success message (green).
    pub(crate) fn success(&self, msg: &str) {
        let _ = self.term.write_line(&self.green.apply_to(msg).to_string());
    }

    /// Print an error message (red).
    pub(crate) fn error(&self, msg: &str) {
        let _ = self.term.write_line(&self.red.apply_to(msg).to_string());
    }
}

/// Write a command result to `path`, or to stdout when `path` is `None`.
///
/// Parent directories of `path` are created as needed.
pub(crate) fn write_result(path: Option<&Path>, content: &str) -> Result<(), CliError> {
    let Some(path) = path else {
        let mut stdout = std::io::stdout().lock();
        stdout.write_all(content.as_bytes())?;
        stdout.flush()?;
        return Ok(());
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, content)?;
    tracing::info!(path = %path.display(), bytes = content.len(), "Wrote output");
    Ok(())
}
