use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("PDF error: {0}")]
    Pdf(#[from] lopdf::Error),
    #[error("Cannot parse PDF {path}: {source}")]
    CorruptPdf {
        path: PathBuf,
        #[source]
        source: lopdf::Error,
    },
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Ingest(#[from] pdf_ingest::IngestError),
    #[error("Manifest error: {0}")]
    Manifest(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[error("Groups {first} and {second} would both be written as '{name}'")]
    DuplicateGroup {
        name: String,
        first: PathBuf,
        second: PathBuf,
    },
    #[error("Group {key} would be written over the combined document {file}")]
    ReservedGroupName { file: String, key: PathBuf },
    #[error("Manifest entry {0:?} is not a plain file name")]
    InvalidGroupName(String),
    #[error(
        "Graded PDF has {actual} pages but the manifest accounts for {expected}; \
         group boundaries would be misaligned"
    )]
    ManifestMisalignment { expected: usize, actual: usize },
    #[error("No PDFs found to bundle")]
    NoGroups,
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, BundleError>;
