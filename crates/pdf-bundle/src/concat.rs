//! Per-group concatenation
//!
//! Each submission group becomes one document: its PDFs in path order, every
//! page stamped with the group name in the group's color.

use crate::constants::COMBINED_FILE_NAME;
use crate::io::{read_pdf, write_pdf};
use crate::manifest::{PageCountManifest, manifest_order};
use crate::options::{BundleOptions, WatermarkOptions};
use crate::pages::PageTreeBuilder;
use crate::types::*;
use crate::watermark::{Color, pick_color, stamp_document};
use lopdf::Document;
use pdf_ingest::SubmissionGroup;
use rand::Rng;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// A written group document
#[derive(Debug, Clone, PartialEq)]
pub struct GroupOutput {
    pub name: String,
    pub key: PathBuf,
    pub path: PathBuf,
    pub page_count: usize,
    pub color: Color,
    /// Source PDFs in the order they were appended
    pub files: Vec<PathBuf>,
}

/// Merge the PDFs of one group, stamping each page unless stamping is disabled
pub fn concatenate_group(
    group: &SubmissionGroup,
    color: Color,
    options: &WatermarkOptions,
) -> Result<Document> {
    let mut builder = PageTreeBuilder::new();

    for file in &group.files {
        let mut source = read_pdf(file)?;
        if options.enabled {
            stamp_document(&mut source, &group.name, color, options)?;
        }
        let added = builder.append_document(&source)?;
        log::debug!("\t{} page(s) from {}", added, file.display());
    }

    Ok(builder.finish())
}

/// Write one document per group into `options.output_dir`, in manifest order
pub fn concatenate_groups(
    mut groups: Vec<SubmissionGroup>,
    options: &BundleOptions,
    rng: &mut impl Rng,
) -> Result<Vec<GroupOutput>> {
    check_unique_names(&groups)?;
    if options.write_combined {
        check_combined_name(&groups)?;
    }
    groups.sort_by(|a, b| manifest_order(&a.name, &b.name));

    let mut outputs = Vec::with_capacity(groups.len());
    for group in groups {
        log::info!("Entering {}", group.key.display());

        let color = pick_color(rng);
        let mut doc = concatenate_group(&group, color, &options.watermark)?;
        let page_count = doc.get_pages().len();

        let path = options.output_dir.join(format!("{}.pdf", group.name));
        write_pdf(&mut doc, &path)?;
        log::info!("\t-> {} ({} pages)", path.display(), page_count);

        outputs.push(GroupOutput {
            name: group.name,
            key: group.key,
            path,
            page_count,
            color,
            files: group.files,
        });
    }

    Ok(outputs)
}

/// Concatenate the group documents in `dir` into `target`, in manifest order.
///
/// Returns the number of pages written.
pub fn combine(manifest: &PageCountManifest, dir: &Path, target: &Path) -> Result<usize> {
    let mut builder = PageTreeBuilder::new();

    for (name, expected) in manifest.entries() {
        let source = read_pdf(&dir.join(format!("{}.pdf", name)))?;
        let added = builder.append_document(&source)?;
        if added != expected {
            log::warn!(
                "{} has {} pages but the manifest lists {}",
                name,
                added,
                expected
            );
        }
    }

    let page_count = builder.page_count();
    let mut doc = builder.finish();
    write_pdf(&mut doc, target)?;
    log::info!("Combined {} groups into {} ({} pages)", manifest.len(), target.display(), page_count);
    Ok(page_count)
}

/// Two groups with the same display name would overwrite each other's output
fn check_unique_names(groups: &[SubmissionGroup]) -> Result<()> {
    let mut seen: HashMap<&str, &Path> = HashMap::new();
    for group in groups {
        if let Some(first) = seen.insert(group.name.as_str(), group.key.as_path()) {
            return Err(BundleError::DuplicateGroup {
                name: group.name.clone(),
                first: first.to_path_buf(),
                second: group.key.clone(),
            });
        }
    }
    Ok(())
}

/// No group may share its output file with the combined document
fn check_combined_name(groups: &[SubmissionGroup]) -> Result<()> {
    for group in groups {
        if format!("{}.pdf", group.name).eq_ignore_ascii_case(COMBINED_FILE_NAME) {
            return Err(BundleError::ReservedGroupName {
                file: COMBINED_FILE_NAME.to_string(),
                key: group.key.clone(),
            });
        }
    }
    Ok(())
}
