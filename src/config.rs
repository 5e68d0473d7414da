//! Pipeline configuration module.
//!
//! Handles loading, validating, and merging `srcsetter.toml`. Stock defaults
//! are the base layer; a user config file overrides just the keys it names.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! raw_dir = "assets/raw"                 # Flat directory of source images
//! out_dir = "public/img"                 # Where variant files are written
//! manifest_path = "public/categories.json"
//! public_prefix = "/img"                 # URL prefix for paths in the manifest
//!
//! [images]
//! widths = [160, 320, 480, 640]          # Ascending target widths
//! default_width = 320                    # Width used for `src`
//! extensions = ["jpg", "jpeg", "png"]    # Accepted source extensions
//!
//! [[images.formats]]                     # First entry is the primary format
//! format = "avif"
//! quality = 50
//!
//! [naming]
//! fingerprint_length = 8
//! fallback_prefix = "cat"
//!
//! [placeholder]
//! size = 64                              # Cover-fit sample edge
//! aspect_ratio = "sample"                # "sample" or "source"
//!
//! [processing]
//! max_processes = 4                      # Omit for auto = CPU cores
//! speed = 6                              # AVIF encoder speed (1-10)
//! ```
//!
//! ## Partial Configuration
//!
//! Config files are sparse: override just the values you want:
//!
//! ```toml
//! [images]
//! widths = [200, 400]
//! ```
//!
//! Arrays (including `[[images.formats]]`) replace the default list wholesale.
//! Unknown keys are rejected to catch typos early.

use crate::imaging::OutputFormat;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Config file looked up in the working directory when `--config` is not given.
pub const DEFAULT_CONFIG_FILE: &str = "srcsetter.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),
}

/// Pipeline configuration loaded from `srcsetter.toml`.
///
/// All fields have defaults that reproduce the stock build: four AVIF widths,
/// 320px default `src`, 8-character fingerprints, 64px placeholder samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Directory scanned (non-recursively) for source images.
    pub raw_dir: PathBuf,
    /// Directory variant files are written to.
    pub out_dir: PathBuf,
    /// Path of the JSON manifest.
    pub manifest_path: PathBuf,
    /// Root-relative URL prefix prepended to variant file names in the manifest.
    pub public_prefix: String,
    /// Responsive variant settings (widths, formats, accepted inputs).
    pub images: ImagesConfig,
    /// Output naming settings.
    pub naming: NamingConfig,
    /// Placeholder sampling settings.
    pub placeholder: PlaceholderConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("assets/raw"),
            out_dir: PathBuf::from("public/img"),
            manifest_path: PathBuf::from("public/categories.json"),
            public_prefix: "/img".to_string(),
            images: ImagesConfig::default(),
            naming: NamingConfig::default(),
            placeholder: PlaceholderConfig::default(),
            processing: ProcessingConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let images = &self.images;
        if images.widths.is_empty() {
            return Err(ConfigError::Validation(
                "images.widths must not be empty".into(),
            ));
        }
        if images.widths.contains(&0) {
            return Err(ConfigError::Validation(
                "images.widths values must be non-zero".into(),
            ));
        }
        if !images.widths.windows(2).all(|w| w[0] < w[1]) {
            return Err(ConfigError::Validation(
                "images.widths must be strictly ascending".into(),
            ));
        }
        if images.formats.is_empty() {
            return Err(ConfigError::Validation(
                "images.formats must list at least one format".into(),
            ));
        }
        let mut seen = HashSet::new();
        for spec in &images.formats {
            if !(1..=100).contains(&spec.quality) {
                return Err(ConfigError::Validation(format!(
                    "images.formats: {} quality must be 1-100",
                    spec.format.extension()
                )));
            }
            if !seen.insert(spec.format) {
                return Err(ConfigError::Validation(format!(
                    "images.formats: {} listed more than once",
                    spec.format.extension()
                )));
            }
        }
        if images.extensions.is_empty() {
            return Err(ConfigError::Validation(
                "images.extensions must not be empty".into(),
            ));
        }
        if !(1..=64).contains(&self.naming.fingerprint_length) {
            return Err(ConfigError::Validation(
                "naming.fingerprint_length must be 1-64".into(),
            ));
        }
        if self.naming.fallback_prefix.is_empty() {
            return Err(ConfigError::Validation(
                "naming.fallback_prefix must not be empty".into(),
            ));
        }
        // ThumbHash only accepts samples up to 100x100.
        if !(1..=100).contains(&self.placeholder.size) {
            return Err(ConfigError::Validation(
                "placeholder.size must be 1-100".into(),
            ));
        }
        if !(1..=10).contains(&self.processing.speed) {
            return Err(ConfigError::Validation(
                "processing.speed must be 1-10".into(),
            ));
        }
        Ok(())
    }
}

/// Responsive variant settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImagesConfig {
    /// Target widths in pixels, strictly ascending.
    pub widths: Vec<u32>,
    /// Width whose primary-format variant becomes the record's `src`.
    /// Falls back to the first width when not present in `widths`.
    pub default_width: u32,
    /// Source file extensions accepted by discovery (case-insensitive).
    pub extensions: Vec<String>,
    /// Output formats in priority order. The first one feeds `src`.
    pub formats: Vec<FormatSpec>,
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            widths: vec![160, 320, 480, 640],
            default_width: 320,
            extensions: vec!["jpg".into(), "jpeg".into(), "png".into()],
            formats: vec![FormatSpec {
                format: OutputFormat::Avif,
                quality: 50,
            }],
        }
    }
}

/// One output format and its encoder quality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FormatSpec {
    pub format: OutputFormat,
    pub quality: u32,
}

/// Output naming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct NamingConfig {
    /// Number of hex characters kept from the content hash.
    pub fingerprint_length: usize,
    /// Prefix for synthetic ids given to sources with an empty stem.
    pub fallback_prefix: String,
}

impl Default for NamingConfig {
    fn default() -> Self {
        Self {
            fingerprint_length: crate::fingerprint::DEFAULT_LENGTH,
            fallback_prefix: "cat".to_string(),
        }
    }
}

/// How the manifest's `aspectRatio` is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AspectRatioMode {
    /// Ratio of the cover-cropped placeholder sample. With a square sample
    /// this is always 1.0.
    #[default]
    Sample,
    /// Ratio of the decoded source image.
    Source,
}

/// Placeholder sampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlaceholderConfig {
    /// Edge length of the square cover-fit sample fed to ThumbHash.
    pub size: u32,
    pub aspect_ratio: AspectRatioMode,
}

impl Default for PlaceholderConfig {
    fn default() -> Self {
        Self {
            size: 64,
            aspect_ratio: AspectRatioMode::default(),
        }
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of parallel image processing workers.
    /// When absent or null, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_processes: Option<usize>,
    /// AVIF encoder speed, 1 (slowest, smallest) to 10 (fastest).
    pub speed: u8,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            max_processes: None,
            speed: 6,
        }
    }
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
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(PipelineConfig::default()).expect("default config must serialize")
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
) -> Result<PipelineConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: PipelineConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from the given file, falling back to stock defaults when the
/// file is absent.
pub fn load_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Load config from a file the user named explicitly.
///
/// Unlike [`load_config`], a missing file is an error rather than a silent
/// fall back to stock defaults.
pub fn load_required_config(path: &Path) -> Result<PipelineConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }
    load_config(path)
}

/// Returns a fully-commented stock `srcsetter.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# srcsetter configuration
# =======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# Flat directory holding the raw source images (not searched recursively).
raw_dir = "assets/raw"

# Directory the generated variants are written to.
out_dir = "public/img"

# The manifest consumed by the frontend. Rewritten from scratch on every run.
manifest_path = "public/categories.json"

# Root-relative URL prefix for variant paths in the manifest.
public_prefix = "/img"

# ---------------------------------------------------------------------------
# Responsive variants
# ---------------------------------------------------------------------------
[images]
# Target widths, strictly ascending. Sources narrower than a width are never
# upscaled; the variant keeps the source's native width.
widths = [160, 320, 480, 640]

# Width used for the record's `src`. Falls back to the first width.
default_width = 320

# Source extensions picked up by discovery (case-insensitive).
extensions = ["jpg", "jpeg", "png"]

# Output formats in priority order. The first one provides `src`; every
# format gets its own `<format>Srcset` entry in the manifest.
# Supported: "avif" (lossy), "jpeg" (lossy), "webp" (lossless, quality unused).
[[images.formats]]
format = "avif"
quality = 50

# [[images.formats]]
# format = "webp"
# quality = 70

# ---------------------------------------------------------------------------
# Naming
# ---------------------------------------------------------------------------
[naming]
# Hex characters of the content hash kept in file names.
fingerprint_length = 8

# Sources whose file name has an empty stem (e.g. ".png") get the id
# "<prefix>_<n>", n being their 1-based discovery position.
fallback_prefix = "cat"

# ---------------------------------------------------------------------------
# Placeholder
# ---------------------------------------------------------------------------
[placeholder]
# Edge of the square cover-fit sample fed to ThumbHash (max 100).
size = 64

# "sample": aspect ratio of the cropped sample (always 1.0 for a square).
# "source": aspect ratio of the original image.
aspect_ratio = "sample"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum parallel image-processing workers.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_processes = 4

# AVIF encoder speed, 1 (slowest, smallest files) to 10 (fastest).
speed = 6
"##
}
