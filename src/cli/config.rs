//! TOML configuration file support.
//!
//! Execution settings for a conversion can be kept in a config file:
//!
//! ```toml
//! # lnstacks.toml
//! [conversion]
//! parallel = true
//! batch_frames = 32
//! progress_interval = 100
//! ```
//!
//! Group and dataset names, and the output path, are fixed and cannot be set
//! here.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Root configuration structure for lnstacks.toml files.
#[derive(Debug, Default, Deserialize)]
pub struct Config {
    /// Conversion-specific settings.
    #[serde(default)]
    pub conversion: ConversionConfig,
}

/// Configuration for a stack conversion.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConversionConfig {
    /// Transform frames in parallel (requires the parallel feature).
    pub parallel: Option<bool>,

    /// Frames per parallel batch.
    pub batch_frames: Option<usize>,

    /// Log progress every this many frames.
    pub progress_interval: Option<usize>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML configuration")
    }
}
