//! `mdsafe export` command implementation.
//!
//! Wraps the sanitized fragment in a standalone HTML document that browsers
//! can print or save as PDF.

use std::fmt::Write;
use std::path::{Path, PathBuf};

use clap::Args;
use mdsafe_renderer::{Pipeline, escape_html};

use super::CommonArgs;
use crate::error::CliError;
use crate::input::Input;
use crate::output::{Output, write_result};

/// Title used when neither the document nor the input names one.
const FALLBACK_TITLE: &str = "document";

/// Arguments for the export command.
#[derive(Args)]
pub(crate) struct ExportArgs {
    /// Markdown file to export (default: stdin).
    file: Option<PathBuf>,

    /// Output file (default: <output_dir>/<file stem>.html).
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Directory for exported documents (overrides config).
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Document title (default: first H1 heading, then file name).
    #[arg(short, long)]
    title: Option<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

impl ExportArgs {
    /// Execute the export command.
    ///
    /// # Errors
    ///
    /// Returns an error if the input or stylesheet cannot be read, rendering
    /// fails, or the document cannot be written.
    pub(crate) fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let input = Input::from_arg(self.file)?;
        let config = self.common.load_config(self.output_dir)?;

        let stylesheet = config
            .export_resolved
            .stylesheet
            .as_deref()
            .map(read_stylesheet)
            .transpose()?;

        let markdown = input.read()?;
        let pipeline = Pipeline::new(config.render_options());
        let document = pipeline.render(&markdown)?;

        let title = resolve_title(
            self.title.as_deref(),
            document.title.as_deref(),
            input.stem(),
        );
        let html = build_document(
            &title,
            &config.export_resolved.lang,
            stylesheet.as_deref(),
            &document.html,
        );

        let path = self.output.unwrap_or_else(|| {
            default_output_path(&config.export_resolved.output_dir, input.stem())
        });
        write_result(Some(&path), &html)?;

        output.success(&format!("Exported {input} to {}", path.display()));
        Ok(())
    }
}

fn read_stylesheet(path: &Path) -> Result<String, CliError> {
    std::fs::read_to_string(path).map_err(|e| {
        CliError::Validation(format!("Cannot read stylesheet {}: {e}", path.display()))
    })
}

/// Pick the document title: explicit flag, first H1, input file stem.
fn resolve_title(explicit: Option<&str>, heading: Option<&str>, stem: Option<&str>) -> String {
    [explicit, heading, stem]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|title| !title.is_empty())
        .unwrap_or(FALLBACK_TITLE)
        .to_owned()
}

fn default_output_path(output_dir: &Path, stem: Option<&str>) -> PathBuf {
    output_dir.join(format!("{}.html", stem.unwrap_or(FALLBACK_TITLE)))
}

/// Build a standalone HTML document around a sanitized fragment.
fn build_document(title: &str, lang: &str, stylesheet: Option<&str>, body: &str) -> String {
    let mut html = String::with_capacity(body.len() + stylesheet.map_or(0, str::len) + 512);
    html.push_str("<!doctype html>\n");
    writeln!(html, r#"<html lang="{}">"#, escape_html(lang)).unwrap();
    html.push_str("<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n",
    );
    writeln!(html, "<title>{}</title>", escape_html(title)).unwrap();
    if let Some(css) = stylesheet {
        // A literal "</style" would end the element early
        writeln!(html, "<style>\n{}\n</style>", css.trim_end().replace("</", "<\\/")).unwrap();
    }
    html.push_str("</head>\n<body>\n<article class=\"markdown-body\">\n");
    html.push_str(body);
    html.push_str("</article>\n</body>\n</html>\n");
    html
}
