//! Application configuration for literate.
//!
//! Config is looked up as `--config <path>`, then `./literate.toml`, then
//! `~/.literate/literate.toml`. CLI flags override config file values, which
//! override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LiterateError, Result};

/// Default configuration file name.
pub const CONFIG_FILE_NAME: &str = "literate.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".literate";

// ---------------------------------------------------------------------------
// Config structs (matching literate.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Global defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Markdown output settings.
    #[serde(default)]
    pub markdown: MarkdownConfig,

    /// Notebook output settings.
    #[serde(default)]
    pub notebook: NotebookConfig,

    /// Execution bridge settings.
    #[serde(default)]
    pub kernel: KernelConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// Directory generated files are written to.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Whether output is meant to be consumed by Documenter.
    #[serde(default = "default_true")]
    pub documenter: bool,

    /// Language of the code chunks.
    #[serde(default = "default_language")]
    pub language: String,

    /// Whether notebooks are executed after generation.
    #[serde(default = "default_true")]
    pub execute: bool,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            documenter: true,
            language: default_language(),
            execute: true,
        }
    }
}

fn default_output_dir() -> String {
    "generated".into()
}
fn default_language() -> String {
    "julia".into()
}
fn default_true() -> bool {
    true
}

/// `[markdown]` section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkdownConfig {
    /// Opening and closing code fence, e.g. `["```julia", "```"]`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codefence: Option<(String, String)>,
}

/// `[notebook]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotebookConfig {
    /// Kernel name written to the notebook's kernelspec.
    #[serde(default = "default_kernel_name")]
    pub kernel_name: String,

    /// Human-readable kernel name.
    #[serde(default = "default_kernel_display_name")]
    pub kernel_display_name: String,

    /// Script file extension written to `language_info`.
    #[serde(default = "default_file_extension")]
    pub file_extension: String,
}

impl Default for NotebookConfig {
    fn default() -> Self {
        Self {
            kernel_name: default_kernel_name(),
            kernel_display_name: default_kernel_display_name(),
            file_extension: default_file_extension(),
        }
    }
}

fn default_kernel_name() -> String {
    "julia-1.0".into()
}
fn default_kernel_display_name() -> String {
    "Julia 1.0".into()
}
fn default_file_extension() -> String {
    ".jl".into()
}

/// `[kernel]` section: the command that executes notebook cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KernelConfig {
    /// Bridge executable. Execution is skipped when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,

    /// Extra arguments passed to the bridge.
    #[serde(default)]
    pub args: Vec<String>,
}

// ---------------------------------------------------------------------------
// Generate config (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime options for one pipeline run.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerateConfig {
    /// Output name, without extension. Also labels `@example` blocks.
    pub name: String,
    /// Apply Documenter-specific adjustments.
    pub documenter: bool,
    /// Explicit code fence pair; `None` picks the default for `documenter`.
    pub codefence: Option<(String, String)>,
    /// Language of the code chunks.
    pub language: String,
    /// Execute the notebook after generation (notebook target only).
    pub execute: bool,
    /// Path of the source file relative to the output directory, written
    /// into the markdown `@meta` block.
    pub edit_url: Option<String>,
    pub kernel_name: String,
    pub kernel_display_name: String,
    /// Extension of a script in `language`, with the leading dot.
    pub file_extension: String,
}

impl GenerateConfig {
    /// Defaults for an output called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_app(&AppConfig::default(), name)
    }

    /// Build runtime options from the loaded config file.
    pub fn from_app(config: &AppConfig, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            documenter: config.defaults.documenter,
            codefence: config.markdown.codefence.clone(),
            language: config.defaults.language.clone(),
            execute: config.defaults.execute,
            edit_url: None,
            kernel_name: config.notebook.kernel_name.clone(),
            kernel_display_name: config.notebook.kernel_display_name.clone(),
            file_extension: config.notebook.file_extension.clone(),
        }
    }

    /// The code fence pair in effect.
    ///
    /// Defaults to an `@example` block named after the output with
    /// Documenter, and a plain language fence without.
    pub fn codefence(&self) -> (String, String) {
        match &self.codefence {
            Some(fence) => fence.clone(),
            None if self.documenter => (format!("```@example {}", self.name), "```".into()),
            None => (format!("```{}", self.language), "```".into()),
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the user config directory (`~/.literate/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| LiterateError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the user config file (`~/.literate/literate.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config.
///
/// An explicit path must exist. Otherwise `./literate.toml` wins over the
/// user file, and defaults are used when neither exists.
pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    if let Some(path) = explicit {
        return load_config_from(path);
    }

    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return load_config_from(&local);
    }

    let path = config_file_path()?;
    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| LiterateError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| LiterateError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Write a default config file, to `path` or the user config location.
/// Returns the path to the created file.
pub fn init_config(path: Option<&Path>) -> Result<PathBuf> {
    let path = match path {
        Some(p) => p.to_path_buf(),
        None => config_file_path()?,
    };

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|e| LiterateError::io(dir, e))?;
    }

    let content = toml::to_string_pretty(&AppConfig::default())
        .map_err(|e| LiterateError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| LiterateError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}
