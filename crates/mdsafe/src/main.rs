//! mdsafe CLI - Safe markdown to HTML converter.
//!
//! Provides commands for:
//! - `render`: Convert markdown to a sanitized HTML fragment
//! - `text`: Print the plain text of a markdown document
//! - `stats`: Print size statistics of a markdown document
//! - `export`: Write a standalone, print-ready HTML document

mod commands;
mod error;
mod input;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CommonArgs, ExportArgs, RenderArgs, StatsArgs, TextArgs};
use output::Output;

/// mdsafe - Safe markdown to HTML converter.
#[derive(Parser)]
#[command(name = "mdsafe", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert markdown to a sanitized HTML fragment.
    Render(RenderArgs),
    /// Print the plain text of a markdown document.
    Text(TextArgs),
    /// Print character, word and page counts.
    Stats(StatsArgs),
    /// Write a standalone HTML document ready for printing.
    Export(ExportArgs),
}

impl Commands {
    fn common(&self) -> &CommonArgs {
        match self {
            Self::Render(args) => &args.common,
            Self::Text(args) => &args.common,
            Self::Stats(args) => &args.common,
            Self::Export(args) => &args.common,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG or default to WARN
    let filter = if cli.command.common().verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Render(args) => args.execute(),
        Commands::Text(args) => args.execute(),
        Commands::Stats(args) => args.execute(),
        Commands::Export(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
