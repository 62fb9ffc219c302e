//! CLI command implementations.

pub(crate) mod export;
pub(crate) mod render;
pub(crate) mod stats;
pub(crate) mod text;

use std::path::PathBuf;

use clap::Args;
use mdsafe_config::{CliSettings, Config};
use mdsafe_renderer::Pipeline;

use crate::error::CliError;

pub(crate) use export::ExportArgs;
pub(crate) use render::RenderArgs;
pub(crate) use stats::StatsArgs;
pub(crate) use text::TextArgs;

/// Flags shared by every command.
#[derive(Args)]
pub(crate) struct CommonArgs {
    /// Path to configuration file (default: auto-discover mdsafe.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Keep single newlines inside paragraphs instead of rendering line breaks.
    #[arg(long)]
    no_breaks: bool,

    /// Disable GitHub Flavored Markdown (tables, strikethrough, task lists, autolinks).
    #[arg(long)]
    no_gfm: bool,

    /// Enable verbose output (render timings and written files).
    #[arg(short, long)]
    pub verbose: bool,
}

impl CommonArgs {
    /// Load configuration with CLI overrides applied.
    pub(crate) fn load_config(&self, output_dir: Option<PathBuf>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            gfm: self.no_gfm.then_some(false),
            breaks: self.no_breaks.then_some(false),
            output_dir,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }

    /// Load configuration and build the markdown pipeline from it.
    pub(crate) fn pipeline(&self) -> Result<Pipeline, CliError> {
        let config = self.load_config(None)?;
        Ok(Pipeline::new(config.render_options()))
    }
}
