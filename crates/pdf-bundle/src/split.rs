//! Splitting a graded concatenation back into per-group files

use crate::io::{read_pdf, write_pdf};
use crate::manifest::PageCountManifest;
use crate::options::SplitOptions;
use crate::pages::PageTreeBuilder;
use crate::types::*;
use lopdf::{Document, ObjectId};
use std::collections::HashMap;
use std::ops::Range;
use std::path::{Path, PathBuf};

/// One written split file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutput {
    pub name: String,
    pub path: PathBuf,
    /// Zero-based index of the group's first page in the graded document
    pub first_page: usize,
    pub page_count: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SplitReport {
    pub outputs: Vec<SplitOutput>,
    /// Pages in the graded document
    pub graded_pages: usize,
}

/// Zero-based page range of every group, in manifest order
pub fn page_ranges(manifest: &PageCountManifest) -> Vec<(String, Range<usize>)> {
    let mut offset = 0;
    manifest
        .entries()
        .map(|(name, count)| {
            let range = offset..offset + count;
            offset += count;
            (name.to_string(), range)
        })
        .collect()
}

/// Write each group's pages of `graded` to `<output_dir>/<name><suffix>.pdf`
pub fn split_document(
    graded: &Document,
    manifest: &PageCountManifest,
    options: &SplitOptions,
) -> Result<SplitReport> {
    options.validate()?;
    check_file_names(manifest)?;

    let page_ids: Vec<ObjectId> = graded.get_pages().values().copied().collect();
    let graded_pages = page_ids.len();
    let expected = manifest.total_pages();

    if graded_pages != expected {
        if !options.allow_misaligned {
            return Err(BundleError::ManifestMisalignment {
                expected,
                actual: graded_pages,
            });
        }
        log::warn!(
            "Graded PDF has {} pages but the manifest accounts for {}; splitting anyway",
            graded_pages,
            expected
        );
    }

    std::fs::create_dir_all(&options.output_dir)?;

    let mut outputs = Vec::with_capacity(manifest.len());
    for (name, range) in page_ranges(manifest) {
        let start = range.start.min(graded_pages);
        let end = range.end.min(graded_pages);
        if start == end {
            log::warn!("No pages left for {}, skipping", name);
            continue;
        }

        let mut builder = PageTreeBuilder::new();
        let mut cache = HashMap::new();
        for &page_id in &page_ids[start..end] {
            builder.append_page(graded, page_id, &mut cache)?;
        }

        let path = options
            .output_dir
            .join(format!("{}{}.pdf", name, options.suffix));
        let mut doc = builder.finish();
        write_pdf(&mut doc, &path)?;
        log::info!(
            "Pages {}-{} -> {}",
            start + 1,
            end,
            path.display()
        );

        outputs.push(SplitOutput {
            name,
            path,
            first_page: start,
            page_count: end - start,
        });
    }

    Ok(SplitReport {
        outputs,
        graded_pages,
    })
}

/// Manifest names become file names, so they must stay inside the output directory
fn check_file_names(manifest: &PageCountManifest) -> Result<()> {
    for (name, _) in manifest.entries() {
        if name.contains(['/', '\\']) {
            return Err(BundleError::InvalidGroupName(name.to_string()));
        }
    }
    Ok(())
}

/// Split the graded PDF at `graded` using the manifest at `manifest_path`
pub async fn split(
    graded: impl AsRef<Path>,
    manifest_path: impl AsRef<Path>,
    options: &SplitOptions,
) -> Result<SplitReport> {
    let manifest = PageCountManifest::load(manifest_path).await?;
    let graded = graded.as_ref().to_owned();
    let options = options.clone();

    tokio::task::spawn_blocking(move || {
        let doc = read_pdf(&graded)?;
        split_document(&doc, &manifest, &options)
    })
    .await?
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_follow_manifest_order() {
        let manifest = PageCountManifest::from_yaml("bob: 2\nalice: 3\nzoe: 0\n").unwrap();
        let ranges = page_ranges(&manifest);
        assert_eq!(
            ranges,
            vec![
                ("bob".to_string(), 0..2),
                ("alice".to_string(), 2..5),
                ("zoe".to_string(), 5..5),
            ]
        );
    }
}
