//! Submission groups: the PDFs collected per submission directory

use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// One submission directory and the PDFs found under it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionGroup {
    /// Directory the group is keyed by
    pub key: PathBuf,
    /// Display name: used for the watermark, the output file and the manifest
    pub name: String,
    /// Member PDFs, sorted ascending by path
    pub files: Vec<PathBuf>,
}

/// Accumulates PDF paths by group while the walk runs.
///
/// The group of a PDF is the first `depth` directories of its location
/// relative to `root`. PDFs that sit shallower than that belong to their own
/// parent directory.
#[derive(Debug, Clone)]
pub struct SubmissionGroups {
    root: PathBuf,
    depth: usize,
    groups: BTreeMap<PathBuf, Vec<PathBuf>>,
}

impl SubmissionGroups {
    pub fn new(root: impl Into<PathBuf>, depth: usize) -> Self {
        Self {
            root: root.into(),
            depth: depth.max(1),
            groups: BTreeMap::new(),
        }
    }

    /// Register a PDF with its group
    pub fn collect(&mut self, pdf: &Path) {
        let key = self.group_key(pdf);
        log::info!("\tAdding {} to concatenation queue", pdf.display());
        self.groups.entry(key).or_default().push(pdf.to_path_buf());
    }

    /// Directory key a PDF at `pdf` belongs to
    pub fn group_key(&self, pdf: &Path) -> PathBuf {
        let parent = pdf.parent().unwrap_or(Path::new(""));
        let Ok(relative) = parent.strip_prefix(&self.root) else {
            return parent.to_path_buf();
        };

        let mut key = self.root.clone();
        for component in relative
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .take(self.depth)
        {
            key.push(component);
        }
        key
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of collected PDFs across all groups
    pub fn file_count(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }

    /// Finish collection, sorting each group's files by path
    pub fn into_groups(self) -> Vec<SubmissionGroup> {
        self.groups
            .into_iter()
            .map(|(key, mut files)| {
                files.sort();
                files.dedup();
                let name = group_name(&key);
                SubmissionGroup { key, name, files }
            })
            .collect()
    }
}

/// Last path component of a group key
fn group_name(key: &Path) -> String {
    key.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| key.display().to_string())
}
