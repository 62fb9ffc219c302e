//! `mdsafe text` command implementation.

use std::path::PathBuf;

use clap::Args;

use super::CommonArgs;
use crate::error::CliError;
use crate::input::Input;
use crate::output::write_result;

/// Arguments for the text command.
#[derive(Args)]
pub(crate) struct TextArgs {
    /// Markdown file to read (default: stdin).
    file: Option<PathBuf>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl TextArgs {
    /// Execute the text command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let input = Input::from_arg(self.file)?;
        let pipeline = self.common.pipeline()?;

        let markdown = input.read()?;
        write_result(None, &pipeline.plain_text(&markdown))
    }
}
