//! Watermarked submission bundles and the grading round trip
//!
//! [`bundle`] turns an export folder into one stamped PDF per submission
//! group plus a page-count manifest; [`split`] uses that manifest to cut a
//! graded concatenation back into per-submission files.

mod bundle;
pub mod concat;
pub mod constants;
mod io;
pub mod manifest;
mod options;
pub mod pages;
pub mod split;
mod types;
pub mod watermark;

pub use bundle::{BundleReport, bundle, bundle_with};
pub use concat::{GroupOutput, combine, concatenate_group, concatenate_groups};
pub use io::{load_pdf, save_pdf};
pub use manifest::PageCountManifest;
pub use options::*;
pub use split::{SplitOutput, SplitReport, page_ranges, split, split_document};
pub use types::*;
pub use watermark::{Color, PALETTE, pick_color, stamp_document};
