//! Run configuration.
//!
//! Handles loading, validating, and merging `appiconizer.toml`. Stock
//! defaults are the base layer; a user config file overrides any subset of
//! them. Command-line flags are applied last, in `main`.
//!
//! ## Config File Location
//!
//! `--config <file>` names the file explicitly (it must exist). Without the
//! flag, `appiconizer.toml` in the working directory is used if present.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! default_profile = "all"      # ios | android | all
//!
//! [output]
//! prefix = "appiconizer"       # name prefix of the output directory / archive
//! png_compression = "best"     # fast | default | best
//!
//! [processing]
//! max_processes = 4            # Max parallel workers (omit for auto = CPU cores)
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::catalog::PlatformProfile;
use crate::imaging::PngCompression;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "appiconizer.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Configuration loaded from `appiconizer.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IconizerConfig {
    /// Profile used when `create` is run without `--device`.
    pub default_profile: PlatformProfile,
    /// Output naming and encoding.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl IconizerConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let prefix = self.output.prefix.trim();
        if prefix.is_empty() {
            return Err(ConfigError::Validation(
                "output.prefix must not be empty".into(),
            ));
        }
        if prefix.contains(['/', '\\']) {
            return Err(ConfigError::Validation(
                "output.prefix must not contain path separators".into(),
            ));
        }
        if self.processing.max_processes == Some(0) {
            return Err(ConfigError::Validation(
                "processing.max_processes must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Output naming and encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Name prefix; the timestamp is appended after a space.
    pub prefix: String,
    /// zlib effort for the PNG encoder. Output pixels are identical at every level.
    pub png_compression: PngCompression,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            prefix: "appiconizer".to_string(),
            png_compression: PngCompression::default(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel render workers.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)` (user can constrain down, not up)
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_processes
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(IconizerConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<IconizerConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: IconizerConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the run configuration.
///
/// An explicit path must exist. Without one, [`DEFAULT_CONFIG_FILE`] in
/// `working_dir` is used when present, otherwise the stock defaults.
pub fn load_config(
    explicit: Option<&Path>,
    working_dir: &Path,
) -> Result<IconizerConfig, ConfigError> {
    let overlay = match explicit {
        Some(path) => {
            Some(load_raw_config(path)?.ok_or_else(|| ConfigError::NotFound(path.into()))?)
        }
        None => load_raw_config(&working_dir.join(DEFAULT_CONFIG_FILE))?,
    };
    resolve_config(stock_defaults_value(), overlay)
}

/// Returns a fully-commented stock `appiconizer.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# appiconizer configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.

# Platform profile used when `create` is run without --device.
# One of: "ios", "android", "all" ("all" renders the union of both sets).
default_profile = "all"

# ---------------------------------------------------------------------------
# Output naming and encoding
# ---------------------------------------------------------------------------
[output]
# Output is written to "<prefix> <YYYY-MM-DD HH.MM.SS>" (a directory, or a
# .zip with --zip) next to the source image or inside --target.
prefix = "appiconizer"

# PNG compression effort: "fast", "default" or "best".
# PNG is lossless, so this only trades encode time for file size.
png_compression = "best"

# ---------------------------------------------------------------------------
# Parallel processing
# ---------------------------------------------------------------------------
[processing]
# Maximum number of parallel render workers.
# Omit to use all available CPU cores. Larger values are clamped to the
# core count. The --cpus flag overrides this value.
# max_processes = 4
"##
}
