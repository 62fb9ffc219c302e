//! `mdsafe render` command implementation.

use std::path::PathBuf;

use clap::Args;

use super::CommonArgs;
use crate::error::CliError;
use crate::input::Input;
use crate::output::write_result;

/// Arguments for the render command.
#[derive(Args)]
pub(crate) struct RenderArgs {
    /// Markdown file to render (default: stdin).
    file: Option<PathBuf>,

    /// Write the HTML fragment to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl RenderArgs {
    /// Execute the render command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read or rendering fails.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let input = Input::from_arg(self.file)?;
        let pipeline = self.common.pipeline()?;

        let markdown = input.read()?;
        let document = pipeline.render(&markdown)?;

        write_result(self.output.as_deref(), &document.html)
    }
}
