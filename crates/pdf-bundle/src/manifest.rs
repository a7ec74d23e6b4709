//! Page-count manifest
//!
//! Records how many pages each group contributed, in the order the groups
//! are meant to be concatenated for grading. Splitting a graded document
//! relies on that order and those counts alone.

use crate::types::*;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;

const MANIFEST_HEADER: &str = "# Pages per submission group, in concatenation order\n";

/// Ordered mapping from group name to page count
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageCountManifest {
    entries: IndexMap<String, usize>,
    stored_total: Option<usize>,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ManifestFile {
    total_pages: usize,
    groups: IndexMap<String, usize>,
}

/// Structured files carry a total; older ones are a bare name-to-count map
#[derive(Deserialize)]
#[serde(untagged)]
enum ManifestLayout {
    Structured(ManifestFile),
    Flat(IndexMap<String, usize>),
}

/// Order in which groups are concatenated: case-insensitive, ties broken by
/// the exact name so the order is total
pub fn manifest_order(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

impl PageCountManifest {
    /// Build a manifest from counts given in any order
    pub fn from_counts<I, S>(counts: I) -> Self
    where
        I: IntoIterator<Item = (S, usize)>,
        S: Into<String>,
    {
        let mut entries: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.into(), count))
            .collect();
        entries.sort_by(|(a, _), (b, _)| manifest_order(a, b));

        Self {
            entries: entries.into_iter().collect(),
            stored_total: None,
        }
    }

    /// Groups and their page counts in concatenation order
    pub fn entries(&self) -> impl Iterator<Item = (&str, usize)> {
        self.entries.iter().map(|(name, count)| (name.as_str(), *count))
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all group page counts
    pub fn total_pages(&self) -> usize {
        self.entries.values().sum()
    }

    /// Total recorded in the file this manifest was read from, if any
    pub fn stored_total(&self) -> Option<usize> {
        self.stored_total
    }

    pub fn to_yaml(&self) -> Result<String> {
        let file = ManifestFile {
            total_pages: self.total_pages(),
            groups: self.entries.clone(),
        };
        let body = serde_yaml::to_string(&file)?;
        Ok(format!("{}{}", MANIFEST_HEADER, body))
    }

    /// Parse a manifest, keeping the file's group order
    pub fn from_yaml(text: &str) -> Result<Self> {
        let manifest = match serde_yaml::from_str(text)? {
            ManifestLayout::Structured(file) => Self {
                entries: file.groups,
                stored_total: Some(file.total_pages),
            },
            ManifestLayout::Flat(entries) => Self {
                entries,
                stored_total: None,
            },
        };

        if let Some(stored) = manifest.stored_total {
            if stored != manifest.total_pages() {
                log::warn!(
                    "Manifest claims {} pages but its groups add up to {}; using the groups",
                    stored,
                    manifest.total_pages()
                );
            }
        }

        Ok(manifest)
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml(&text)
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    /// Load a manifest file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&text)
    }

    /// Save to a manifest file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        tokio::fs::write(path, self.to_yaml()?).await?;
        Ok(())
    }
}
