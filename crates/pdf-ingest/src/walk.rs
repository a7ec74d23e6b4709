//! Fixed-point walk over an export folder
//!
//! A single pass scans the whole tree once and dispatches every file it has
//! not seen before. Expanding an archive or converting an image creates new
//! files, so passes repeat until one of them finds nothing new:
//! 1. Scan the tree, skipping everything in the [`IgnoreSet`]
//! 2. Dispatch the remaining files by [`FileKind`]
//! 3. Fold the touched paths into the ignore set
//! 4. Stop once a pass touches zero files
//!
//! Termination relies on archive expansion being acyclic. A pass limit turns
//! a violation into an error instead of an endless loop.

use crate::dispatch::{FileKind, file_extension};
use crate::groups::SubmissionGroups;
use crate::handlers::{FsHandlers, Handlers};
use crate::options::IngestOptions;
use crate::types::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file seen during one pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    pub path: PathBuf,
    /// Lowercase extension, empty if none
    pub extension: String,
    pub kind: FileKind,
}

impl FileRecord {
    pub fn new(path: PathBuf) -> Self {
        Self {
            extension: file_extension(&path),
            kind: FileKind::classify(&path),
            path,
        }
    }
}

/// Absolute paths already handled in this run. Only ever grows.
#[derive(Debug, Clone, Default)]
pub struct IgnoreSet {
    seen: HashSet<PathBuf>,
}

impl IgnoreSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.seen.contains(path)
    }

    pub fn insert(&mut self, path: PathBuf) -> bool {
        self.seen.insert(path)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.seen.iter().map(PathBuf::as_path)
    }
}

impl Extend<PathBuf> for IgnoreSet {
    fn extend<I: IntoIterator<Item = PathBuf>>(&mut self, iter: I) {
        self.seen.extend(iter);
    }
}

/// Result of walking an export folder to its fixed point
#[derive(Debug)]
pub struct WalkOutcome {
    pub groups: SubmissionGroups,
    /// Every file handled during the run
    pub ignored: IgnoreSet,
    /// Passes that discovered at least one file. The final empty scan is not counted.
    pub passes: usize,
    /// Files with no handler, in discovery order
    pub unhandled: Vec<PathBuf>,
}

/// Scan `root` once and dispatch every file not in `ignore`.
///
/// Returns the files touched by this pass. Files in `ignore` are skipped
/// without any side effect.
pub fn walk_pass<H: Handlers + ?Sized>(
    root: &Path,
    options: &IngestOptions,
    ignore: &IgnoreSet,
    handlers: &mut H,
    groups: &mut SubmissionGroups,
) -> Result<Vec<FileRecord>> {
    let mut touched = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !is_excluded(entry.path(), &options.exclude));

    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let path = entry.path();
        if ignore.contains(path) {
            continue;
        }

        let record = FileRecord::new(path.to_path_buf());
        log::info!("Handling file {} ({})...", path.display(), record.extension);
        dispatch(&record, handlers, groups)?;
        touched.push(record);
    }

    Ok(touched)
}

fn dispatch<H: Handlers + ?Sized>(
    record: &FileRecord,
    handlers: &mut H,
    groups: &mut SubmissionGroups,
) -> Result<()> {
    let path = record.path.as_path();

    match record.kind {
        FileKind::Archive(format) => {
            let dest = path.parent().unwrap_or(Path::new("."));
            handlers.expand_archive(path, format, dest)?;
        }
        FileKind::Image(format) => {
            handlers.convert_image(path, format)?;
        }
        FileKind::Pdf => groups.collect(path),
        FileKind::Unhandled => {
            log::warn!("No handler for '{}'! Skipping {}", record.extension, path.display());
        }
    }

    Ok(())
}

fn is_excluded(path: &Path, exclude: &[PathBuf]) -> bool {
    exclude.iter().any(|excluded| path == excluded)
}

/// Repeat [`walk_pass`] until a pass discovers nothing new
pub fn collect_to_fixed_point<H: Handlers + ?Sized>(
    root: &Path,
    options: &IngestOptions,
    handlers: &mut H,
) -> Result<WalkOutcome> {
    options.validate()?;

    let root = std::fs::canonicalize(root)?;
    let mut options = options.clone();
    options.exclude = options
        .exclude
        .iter()
        .map(|p| std::fs::canonicalize(p).unwrap_or_else(|_| p.clone()))
        .collect();

    let mut groups = SubmissionGroups::new(&root, options.group_depth);
    let mut ignored = IgnoreSet::new();
    let mut unhandled = Vec::new();
    let mut passes = 0;

    loop {
        let touched = walk_pass(&root, &options, &ignored, handlers, &mut groups)?;
        log::debug!("Pass {} handled {} new files", passes + 1, touched.len());

        if touched.is_empty() {
            break;
        }
        passes += 1;
        if passes > options.max_passes {
            return Err(IngestError::FixedPointNotReached {
                root,
                passes: options.max_passes,
            });
        }

        for record in touched {
            if record.kind == FileKind::Unhandled {
                unhandled.push(record.path.clone());
            }
            ignored.insert(record.path);
        }
    }

    Ok(WalkOutcome {
        groups,
        ignored,
        passes,
        unhandled,
    })
}

/// Walk `root` to its fixed point with the filesystem handlers
pub async fn collect(root: impl AsRef<Path>, options: &IngestOptions) -> Result<WalkOutcome> {
    let root = root.as_ref().to_owned();
    let options = options.clone();

    tokio::task::spawn_blocking(move || {
        let mut handlers = FsHandlers::new(&options);
        collect_to_fixed_point(&root, &options, &mut handlers)
    })
    .await?
}
