//! Submission export ingestion
//!
//! Walks an export folder until no new files appear, expanding archives in
//! place, rendering images to PDF and collecting every PDF into the
//! submission group of the directory it was found in.

pub mod dispatch;
pub mod groups;
pub mod handlers;
mod options;
mod types;
pub mod walk;

pub use dispatch::{ArchiveFormat, FileKind, ImageFormat};
pub use groups::{SubmissionGroup, SubmissionGroups};
pub use handlers::{FsHandlers, Handlers};
pub use options::IngestOptions;
pub use types::*;
pub use walk::{FileRecord, IgnoreSet, WalkOutcome, collect, collect_to_fixed_point, walk_pass};
