use crate::dispatch::ArchiveFormat;
use crate::types::*;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Expand an archive into `dest`, creating files as they are stored.
///
/// Entries that would escape `dest` are skipped by the archive readers.
pub fn expand_archive(archive: &Path, format: ArchiveFormat, dest: &Path) -> Result<()> {
    let file = BufReader::new(File::open(archive)?);

    match format {
        ArchiveFormat::Zip => {
            let mut zip = zip::ZipArchive::new(file).map_err(|e| archive_error(archive, e))?;
            log::debug!("{} holds {} entries", archive.display(), zip.len());
            zip.extract(dest).map_err(|e| archive_error(archive, e))
        }
        ArchiveFormat::Tar => unpack_tar(archive, file, dest),
        ArchiveFormat::TarGz => unpack_tar(archive, GzDecoder::new(file), dest),
    }
}

fn unpack_tar(archive: &Path, reader: impl Read, dest: &Path) -> Result<()> {
    tar::Archive::new(reader)
        .unpack(dest)
        .map_err(|e| archive_error(archive, e))
}

fn archive_error(archive: &Path, err: impl std::fmt::Display) -> IngestError {
    IngestError::Archive {
        path: archive.to_path_buf(),
        message: err.to_string(),
    }
}
