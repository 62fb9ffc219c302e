//! Configuration management for mdsafe.
//!
//! Parses `mdsafe.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! CLI settings can be applied during load via [`CliSettings`].
//!
//! ## Environment Variable Expansion
//!
//! Path values support environment variable expansion:
//!
//! - `${VAR}` - expands to the value of VAR, errors if unset
//! - `${VAR:-default}` - expands to VAR if set, otherwise uses default
//!
//! Expanded fields:
//! - `export.output_dir`
//! - `export.stylesheet`

mod expand;

use mdsafe_renderer::RenderOptions;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// CLI settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Override GitHub Flavored Markdown extensions.
    pub gfm: Option<bool>,
    /// Override single-newline line breaks.
    pub breaks: Option<bool>,
    /// Override export output directory.
    pub output_dir: Option<PathBuf>,
}

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "mdsafe.toml";

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Markdown rendering configuration.
    pub render: RenderConfig,
    /// Export configuration (paths are relative strings from TOML).
    export: ExportConfigRaw,

    /// Resolved export configuration (set after loading).
    #[serde(skip)]
    pub export_resolved: ExportConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Markdown rendering configuration.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct RenderConfig {
    /// Enable tables, strikethrough, task lists and bare URL autolinks.
    pub gfm: bool,
    /// Render single newlines as line breaks.
    pub breaks: bool,
    /// Open absolute links in a new tab.
    pub external_links_new_tab: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        let options = RenderOptions::default();
        Self {
            gfm: options.gfm,
            breaks: options.breaks,
            external_links_new_tab: options.external_links_new_tab,
        }
    }
}

/// Raw export configuration as parsed from TOML (paths as strings).
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct ExportConfigRaw {
    output_dir: Option<String>,
    stylesheet: Option<String>,
    lang: Option<String>,
}

/// Resolved export configuration with absolute paths.
#[derive(Debug, PartialEq, Eq)]
pub struct ExportConfig {
    /// Directory exported documents are written to.
    pub output_dir: PathBuf,
    /// Stylesheet inlined into exported documents.
    pub stylesheet: Option<PathBuf>,
    /// Document language for the `<html lang>` attribute.
    pub lang: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            stylesheet: None,
            lang: DEFAULT_LANG.to_owned(),
        }
    }
}

const DEFAULT_LANG: &str = "en";

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`export.output_dir`").
        field: String,
        /// Error message (e.g., "${`EXPORT_DIR`} not set").
        message: String,
    },
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a language tag shaped like `en`, `pt-BR` or `zh-Hant-TW`.
fn require_lang_tag(value: &str, field: &str) -> Result<(), ConfigError> {
    require_non_empty(value, field)?;
    let valid = value.split('-').enumerate().all(|(i, subtag)| {
        let max_len = if i == 0 { 3 } else { 8 };
        (1..=max_len).contains(&subtag.len())
            && subtag.chars().all(|c| c.is_ascii_alphanumeric())
            && (i > 0 || subtag.chars().all(|c| c.is_ascii_alphabetic()))
    });
    if !valid {
        return Err(ConfigError::Validation(format!(
            "{field} is not a valid language tag: {value:?}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `mdsafe.toml` in current directory and parents.
    ///
    /// CLI settings are applied after loading and path resolution, allowing CLI
    /// arguments to take precedence over config file values.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist or parsing fails.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    /// Rendering options for the markdown pipeline.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            gfm: self.render.gfm,
            breaks: self.render.breaks,
            external_links_new_tab: self.render.external_links_new_tab,
        }
    }

    /// Apply CLI settings to the configuration.
    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(gfm) = settings.gfm {
            self.render.gfm = gfm;
        }
        if let Some(breaks) = settings.breaks {
            self.render.breaks = breaks;
        }
        if let Some(output_dir) = &settings.output_dir {
            self.export_resolved.output_dir.clone_from(output_dir);
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let cwd = std::env::current_dir().ok()?;
        Self::discover_from(&cwd)
    }

    /// Search for config file in `start` and its parents.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Create default config with paths relative to current working directory.
    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    /// Create default config with paths relative to given base directory.
    fn default_with_base(base: &Path) -> Self {
        Self {
            render: RenderConfig::default(),
            export: ExportConfigRaw::default(),
            export_resolved: ExportConfig {
                output_dir: base.to_path_buf(),
                ..ExportConfig::default()
            },
            config_path: None,
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        // Validate configuration after loading and resolution
        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_export()
    }

    /// Validate export configuration.
    fn validate_export(&self) -> Result<(), ConfigError> {
        require_lang_tag(&self.export_resolved.lang, "export.lang")?;
        require_non_empty(
            &self.export_resolved.output_dir.to_string_lossy(),
            "export.output_dir",
        )?;
        if let Some(stylesheet) = &self.export_resolved.stylesheet
            && stylesheet.file_name().is_none()
        {
            return Err(ConfigError::Validation(format!(
                "export.stylesheet must name a file: {}",
                stylesheet.display()
            )));
        }
        Ok(())
    }

    /// Expand environment variable references in configuration strings.
    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        if let Some(ref dir) = self.export.output_dir {
            self.export.output_dir = Some(expand::expand_env(dir, "export.output_dir")?);
        }
        if let Some(ref stylesheet) = self.export.stylesheet {
            self.export.stylesheet = Some(expand::expand_env(stylesheet, "export.stylesheet")?);
        }
        Ok(())
    }

    /// Resolve relative paths to absolute paths based on config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        self.export_resolved = ExportConfig {
            output_dir: config_dir.join(self.export.output_dir.as_deref().unwrap_or(".")),
            stylesheet: self.export.stylesheet.as_deref().map(|s| config_dir.join(s)),
            lang: self
                .export
                .lang
                .clone()
                .unwrap_or_else(|| DEFAULT_LANG.to_owned()),
        };
    }
}
