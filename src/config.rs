//! Configuration file loading with environment variable overrides.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::model::{DEFAULT_IDEAS_MODEL, DEFAULT_IMAGE_MODEL};

/// Environment variables consulted for the Gemini key, in order.
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// API key configuration.
    #[serde(default)]
    pub keys: KeysConfig,

    /// Model selection.
    #[serde(default)]
    pub models: ModelsConfig,

    /// Service endpoint overrides.
    #[serde(default)]
    pub service: ServiceConfig,

    /// Session behaviour.
    #[serde(default)]
    pub session: SessionConfig,

    /// Where images are written.
    #[serde(default)]
    pub output: OutputConfig,
}

/// API key configuration.
#[derive(Debug, Default, Deserialize)]
pub struct KeysConfig {
    /// Gemini API key.
    pub gemini: Option<String>,
}

/// Model selection from config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ModelsConfig {
    /// Model (or alias) for outfit ideas.
    pub ideas: String,
    /// Model (or alias) for renders and edits.
    pub image: String,
}

impl Default for ModelsConfig {
    fn default() -> Self {
        Self { ideas: DEFAULT_IDEAS_MODEL.to_string(), image: DEFAULT_IMAGE_MODEL.to_string() }
    }
}

/// Service endpoint overrides.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceConfig {
    /// Base URL for model calls, e.g. a proxy in front of the Gemini API.
    pub base_url: Option<String>,
}

/// Session behaviour from config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Reveal policy: `all` or `incremental`.
    pub reveal: String,
    /// Aspect ratio requested for renders.
    pub aspect_ratio: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self { reveal: "all".to_string(), aspect_ratio: None }
    }
}

/// Output settings from config file.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving the item copy and outfit images.
    pub dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self { dir: "stylist-output".to_string() }
    }
}

impl Config {
    /// Load configuration from the given path, or return defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config {}: {e}", path.display()))?;
        toml::from_str(&contents)
            .map_err(|e| format!("Failed to parse config {}: {e}", path.display()))
    }

    /// Get the Gemini API key, preferring environment variables.
    #[must_use]
    pub fn gemini_key(&self) -> Option<String> {
        API_KEY_ENV_VARS
            .iter()
            .find_map(|var| std::env::var(var).ok().filter(|v| !v.trim().is_empty()))
            .or_else(|| self.file_key())
    }

    /// The key from `[keys] gemini`, unless it is blank.
    fn file_key(&self) -> Option<String> {
        self.keys.gemini.clone().filter(|k| !k.trim().is_empty())
    }
}

/// Discover the config file path using the resolution order:
/// 1. Explicit path (from `--config` flag)
/// 2. `STYLIST_CONFIG` environment variable
/// 3. `~/.config/stylist/config.toml`
#[must_use]
pub fn discover_config_path(explicit: Option<&str>) -> PathBuf {
    if let Some(p) = explicit {
        return PathBuf::from(p);
    }

    if let Ok(p) = std::env::var("STYLIST_CONFIG") {
        return PathBuf::from(p);
    }

    default_config_path()
}

/// Default config path: `~/.config/stylist/config.toml`.
fn default_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".config/stylist/config.toml")
    } else {
        PathBuf::from("stylist.toml")
    }
}
