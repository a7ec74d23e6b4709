use crate::types::*;
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Controls how an export folder is walked and grouped
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IngestOptions {
    /// Number of directory levels below the root that identify a group
    pub group_depth: usize,

    /// Upper bound on walk passes that discover files before giving up on the fixed point
    pub max_passes: usize,

    /// Resolution used when placing a converted image on its page
    pub image_dpi: f32,

    /// Directories pruned from every walk (e.g. an output folder inside the export)
    pub exclude: Vec<PathBuf>,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            group_depth: 1,
            max_passes: 32,
            image_dpi: 72.0,
            exclude: Vec::new(),
        }
    }
}

impl IngestOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| IngestError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.group_depth == 0 {
            return Err(IngestError::Config(
                "Group depth must be at least 1".to_string(),
            ));
        }

        if self.max_passes == 0 {
            return Err(IngestError::Config(
                "At least one walk pass is required".to_string(),
            ));
        }

        if !(self.image_dpi.is_finite() && self.image_dpi > 0.0) {
            return Err(IngestError::Config(format!(
                "Image DPI must be positive, got {}",
                self.image_dpi
            )));
        }

        Ok(())
    }
}
