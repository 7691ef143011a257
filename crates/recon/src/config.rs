use std::path::PathBuf;

use serde::Deserialize;

use crate::error::ReconError;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Run configuration, usually read from `tracksla.toml`. Every table is
/// optional; an empty file yields the defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrackConfig {
    #[serde(default)]
    pub paths: PathsConfig,
    #[serde(default)]
    pub sla: SlaThresholds,
    #[serde(default)]
    pub output: OutputConfig,
}

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct PathsConfig {
    /// Compressed report bundle.
    #[serde(default = "default_archive")]
    pub archive: PathBuf,
    /// Where the bundle is unpacked; also the directory scanned for reports.
    #[serde(default = "default_extract_to")]
    pub extract_to: PathBuf,
    #[serde(default = "default_output_root")]
    pub output_root: PathBuf,
    /// File pattern matched inside `extract_to`.
    #[serde(default = "default_input_pattern")]
    pub input_pattern: String,
}

fn default_archive() -> PathBuf {
    PathBuf::from("data").join("skynet_report.zip")
}

fn default_extract_to() -> PathBuf {
    PathBuf::from("data").join("unzipped")
}

fn default_output_root() -> PathBuf {
    PathBuf::from("output")
}

fn default_input_pattern() -> String {
    "*.xls".into()
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            archive: default_archive(),
            extract_to: default_extract_to(),
            output_root: default_output_root(),
            input_pattern: default_input_pattern(),
        }
    }
}

// ---------------------------------------------------------------------------
// SLA thresholds
// ---------------------------------------------------------------------------

/// Inclusive upper bounds, in days, for the Green and Yellow buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct SlaThresholds {
    #[serde(default = "default_green_max")]
    pub green_max_days: i64,
    #[serde(default = "default_yellow_max")]
    pub yellow_max_days: i64,
}

fn default_green_max() -> i64 {
    8
}

fn default_yellow_max() -> i64 {
    10
}

impl Default for SlaThresholds {
    fn default() -> Self {
        Self {
            green_max_days: default_green_max(),
            yellow_max_days: default_yellow_max(),
        }
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// RGB hex fill for interpolated cells, without `#`.
    #[serde(default = "default_highlight")]
    pub highlight_color: String,
}

fn default_highlight() -> String {
    "FFFF00".into()
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            highlight_color: default_highlight(),
        }
    }
}

impl OutputConfig {
    /// Highlight colour as `0xRRGGBB`.
    pub fn highlight_rgb(&self) -> Result<u32, ReconError> {
        let hex = self.highlight_color.trim_start_matches('#');
        if hex.len() != 6 {
            return Err(ReconError::ConfigValidation(format!(
                "highlight_color must be 6 hex digits, got '{}'",
                self.highlight_color
            )));
        }
        u32::from_str_radix(hex, 16).map_err(|_| {
            ReconError::ConfigValidation(format!(
                "highlight_color is not hex: '{}'",
                self.highlight_color
            ))
        })
    }
}

// ---------------------------------------------------------------------------
// Parse + Validate
// ---------------------------------------------------------------------------

impl TrackConfig {
    pub fn from_toml(input: &str) -> Result<Self, ReconError> {
        let config: TrackConfig =
            toml::from_str(input).map_err(|e| ReconError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ReconError> {
        if self.sla.green_max_days >= self.sla.yellow_max_days {
            return Err(ReconError::ConfigValidation(format!(
                "sla.green_max_days ({}) must be below sla.yellow_max_days ({})",
                self.sla.green_max_days, self.sla.yellow_max_days
            )));
        }

        if self.paths.input_pattern.trim().is_empty() {
            return Err(ReconError::ConfigValidation(
                "paths.input_pattern must not be empty".into(),
            ));
        }

        self.output.highlight_rgb()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
