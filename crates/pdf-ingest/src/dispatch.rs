//! File classification by extension
//!
//! Classification looks only at the file name suffix; content is never
//! sniffed. Every file maps to exactly one [`FileKind`], with
//! [`FileKind::Unhandled`] for everything the tool does not know.

use std::path::Path;

/// Supported archive containers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveFormat {
    Zip,
    Tar,
    /// Gzip-compressed tar (`.tgz`, `.tar.gz`, `.gztar`)
    TarGz,
}

/// Raster formats that get rendered to a single-page PDF
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
    Bmp,
    Tiff,
    WebP,
}

/// What the walker should do with a file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Expand into the containing directory
    Archive(ArchiveFormat),
    /// Render as a sibling PDF
    Image(ImageFormat),
    /// Register with the containing directory's group
    Pdf,
    /// Recorded as seen and skipped
    Unhandled,
}

impl FileKind {
    /// Classify a lowercase extension on its own
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "zip" => FileKind::Archive(ArchiveFormat::Zip),
            "tar" => FileKind::Archive(ArchiveFormat::Tar),
            "tgz" | "gztar" => FileKind::Archive(ArchiveFormat::TarGz),
            "jpg" | "jpeg" => FileKind::Image(ImageFormat::Jpeg),
            "png" => FileKind::Image(ImageFormat::Png),
            "gif" => FileKind::Image(ImageFormat::Gif),
            "bmp" => FileKind::Image(ImageFormat::Bmp),
            "tif" | "tiff" => FileKind::Image(ImageFormat::Tiff),
            "webp" => FileKind::Image(ImageFormat::WebP),
            "pdf" => FileKind::Pdf,
            _ => FileKind::Unhandled,
        }
    }

    /// Classify a path. `.gz` only counts as an archive when it wraps a tar.
    pub fn classify(path: &Path) -> Self {
        let ext = file_extension(path);
        if ext == "gz" {
            let wraps_tar = path
                .file_stem()
                .map(|stem| file_extension(Path::new(stem)) == "tar")
                .unwrap_or(false);
            return if wraps_tar {
                FileKind::Archive(ArchiveFormat::TarGz)
            } else {
                FileKind::Unhandled
            };
        }
        Self::from_extension(&ext)
    }
}

/// Lowercase extension without the dot; empty when there is none
pub fn file_extension(path: &Path) -> String {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}
