//! Shared constants for bundling and splitting

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

/// Convert millimeters to points
#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

// =============================================================================
// Page Defaults
// =============================================================================

/// Fallback MediaBox (US Letter) for pages that carry none
pub const DEFAULT_MEDIA_BOX: [f32; 4] = [0.0, 0.0, 612.0, 792.0];

/// PDF version of generated documents
pub const OUTPUT_PDF_VERSION: &str = "1.7";

/// Page attributes a page may inherit from its ancestors in the page tree
pub const INHERITABLE_PAGE_KEYS: [&[u8]; 4] = [b"Resources", b"MediaBox", b"CropBox", b"Rotate"];

/// Page tree ancestors followed before giving up on an inherited attribute
pub const MAX_PAGE_TREE_DEPTH: usize = 64;

// =============================================================================
// Watermark
// =============================================================================

/// Resource name of the watermark font inside each page's /Font dictionary
pub const WATERMARK_FONT_RESOURCE: &str = "WmHelv";

/// Standard 14 font used for watermark text
pub const WATERMARK_BASE_FONT: &str = "Helvetica";

// =============================================================================
// Output Files
// =============================================================================

/// Default directory for merged group PDFs and the manifest
pub const DEFAULT_OUTPUT_DIR: &str = "gen";

/// Default directory for split results
pub const DEFAULT_SPLIT_DIR: &str = "gen_split";

/// Default manifest file name
pub const MANIFEST_FILE_NAME: &str = "page_counts.yaml";

/// File name of the optional all-groups concatenation
pub const COMBINED_FILE_NAME: &str = "all_submissions.pdf";

/// Default suffix appended to split output names
pub const DEFAULT_SPLIT_SUFFIX: &str = "_corrected";
