//! Side-effecting handlers the walker dispatches to
//!
//! Archives and images produce new files that a later walk pass picks up;
//! PDFs are registered directly with [`crate::SubmissionGroups`] by the walker.

mod archive;
mod raster;

pub use archive::expand_archive;
pub use raster::{convert_image, image_pdf_path, render_image_pdf};

use crate::dispatch::{ArchiveFormat, ImageFormat};
use crate::options::IngestOptions;
use crate::types::Result;
use std::path::{Path, PathBuf};

/// Capabilities the walker needs from the outside world
pub trait Handlers {
    /// Expand `archive` into `dest`
    fn expand_archive(&mut self, archive: &Path, format: ArchiveFormat, dest: &Path)
    -> Result<()>;

    /// Render `image` as a single-page PDF next to it, returning the new path
    fn convert_image(&mut self, image: &Path, format: ImageFormat) -> Result<PathBuf>;
}

/// Handlers backed by the real filesystem
#[derive(Debug, Clone)]
pub struct FsHandlers {
    image_dpi: f32,
}

impl FsHandlers {
    pub fn new(options: &IngestOptions) -> Self {
        Self {
            image_dpi: options.image_dpi,
        }
    }
}

impl Default for FsHandlers {
    fn default() -> Self {
        Self::new(&IngestOptions::default())
    }
}

impl Handlers for FsHandlers {
    fn expand_archive(
        &mut self,
        archive: &Path,
        format: ArchiveFormat,
        dest: &Path,
    ) -> Result<()> {
        log::info!("\tUnpacking {} to {}", archive.display(), dest.display());
        expand_archive(archive, format, dest)
    }

    fn convert_image(&mut self, image: &Path, _format: ImageFormat) -> Result<PathBuf> {
        let target = image_pdf_path(image);
        log::info!("\tConverting {} into {}", image.display(), target.display());
        convert_image(image, &target, self.image_dpi)?;
        Ok(target)
    }
}
