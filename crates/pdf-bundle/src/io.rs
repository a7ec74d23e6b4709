//! Document I/O

use crate::types::*;
use lopdf::Document;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Load a single PDF document
pub async fn load_pdf(path: impl AsRef<Path>) -> Result<Document> {
    let path = path.as_ref().to_owned();
    tokio::task::spawn_blocking(move || read_pdf(&path)).await?
}

/// Save a document
pub async fn save_pdf(mut doc: Document, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref().to_owned();
    let bytes = tokio::task::spawn_blocking(move || {
        let mut writer = Vec::new();
        doc.save_to(&mut writer)?;
        Ok::<_, BundleError>(writer)
    })
    .await??;
    tokio::fs::write(&path, bytes).await?;
    Ok(())
}

/// Read and parse a PDF, naming the file if it cannot be parsed at all
pub(crate) fn read_pdf(path: &Path) -> Result<Document> {
    let bytes = std::fs::read(path)?;
    Document::load_mem(&bytes).map_err(|source| BundleError::CorruptPdf {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_pdf(doc: &mut Document, path: &Path) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    doc.save_to(&mut writer)?;
    writer.flush()?;
    Ok(())
}
