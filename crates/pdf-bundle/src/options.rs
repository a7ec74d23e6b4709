use crate::constants::*;
use crate::types::*;
use pdf_ingest::IngestOptions;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Appearance of the per-page group stamp
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct WatermarkOptions {
    /// Stamp pages at all
    pub enabled: bool,
    /// Font size in points
    pub font_size_pt: f32,
    /// Distance from the visual left edge
    pub offset_x_mm: f32,
    /// Distance from the visual bottom edge
    pub offset_y_mm: f32,
}

impl Default for WatermarkOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            font_size_pt: 10.0,
            offset_x_mm: 5.0,
            offset_y_mm: 2.0,
        }
    }
}

/// Configuration of a bundling run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct BundleOptions {
    // Input
    pub ingest: IngestOptions,

    // Output
    pub output_dir: PathBuf,
    pub manifest_file_name: String,
    /// Also write every group, in manifest order, into one document
    pub write_combined: bool,

    // Stamping
    pub watermark: WatermarkOptions,
    /// Seed for the watermark color choice; random when unset
    pub seed: Option<u64>,
}

impl Default for BundleOptions {
    fn default() -> Self {
        Self {
            ingest: IngestOptions::default(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            manifest_file_name: MANIFEST_FILE_NAME.to_string(),
            write_combined: false,
            watermark: WatermarkOptions::default(),
            seed: None,
        }
    }
}

impl BundleOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| BundleError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| BundleError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Where the manifest is written
    pub fn manifest_path(&self) -> PathBuf {
        self.output_dir.join(&self.manifest_file_name)
    }

    /// Where the combined document is written when enabled
    pub fn combined_path(&self) -> PathBuf {
        self.output_dir.join(COMBINED_FILE_NAME)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        self.ingest.validate()?;

        if self.manifest_file_name.trim().is_empty() {
            return Err(BundleError::Config(
                "Manifest file name must not be empty".to_string(),
            ));
        }

        let mark = &self.watermark;
        if mark.enabled && !(mark.font_size_pt.is_finite() && mark.font_size_pt > 0.0) {
            return Err(BundleError::Config(format!(
                "Watermark font size must be positive, got {}",
                mark.font_size_pt
            )));
        }

        if !(mark.offset_x_mm.is_finite() && mark.offset_y_mm.is_finite()) {
            return Err(BundleError::Config(
                "Watermark offsets must be finite".to_string(),
            ));
        }

        Ok(())
    }
}

/// Configuration of a split run
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SplitOptions {
    pub output_dir: PathBuf,
    /// Appended to each group name to form the output file name
    pub suffix: String,
    /// Split even when the graded page count disagrees with the manifest
    pub allow_misaligned: bool,
}

impl Default for SplitOptions {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_SPLIT_DIR),
            suffix: DEFAULT_SPLIT_SUFFIX.to_string(),
            allow_misaligned: false,
        }
    }
}

impl SplitOptions {
    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.suffix.contains(['/', '\\']) {
            return Err(BundleError::Config(format!(
                "Suffix must not contain path separators: {:?}",
                self.suffix
            )));
        }
        Ok(())
    }
}
