//! `mdsafe stats` command implementation.

use std::path::PathBuf;

use clap::Args;
use mdsafe_renderer::DocumentStats;

use super::CommonArgs;
use crate::error::CliError;
use crate::input::Input;
use crate::output::write_result;

/// Arguments for the stats command.
#[derive(Args)]
pub(crate) struct StatsArgs {
    /// Markdown file to measure (default: stdin).
    file: Option<PathBuf>,

    /// Print statistics as JSON.
    #[arg(long)]
    json: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl StatsArgs {
    /// Execute the stats command.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let input = Input::from_arg(self.file)?;
        let pipeline = self.common.pipeline()?;

        let markdown = input.read()?;
        let stats = pipeline.stats(&markdown);

        let report = if self.json {
            let mut json = serde_json::to_string_pretty(&stats)?;
            json.push('\n');
            json
        } else {
            format_stats(&stats)
        };
        write_result(None, &report)
    }
}

fn format_stats(stats: &DocumentStats) -> String {
    format!(
        "Characters: {}\nWords: {}\nEstimated pages: {}\n",
        stats.characters, stats.words, stats.estimated_pages
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_format_stats() {
        let stats = DocumentStats {
            characters: 2500,
            words: 400,
            estimated_pages: 2,
        };
        assert_eq!(
            format_stats(&stats),
            "Characters: 2500\nWords: 400\nEstimated pages: 2\n"
        );
    }

    #[test]
    fn test_stats_json_shape() {
        let stats = DocumentStats {
            characters: 11,
            words: 2,
            estimated_pages: 1,
        };
        let value = serde_json::to_value(stats).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"characters": 11, "words": 2, "estimated_pages": 1})
        );
    }
}
