use crate::concat::{GroupOutput, combine, concatenate_groups};
use crate::manifest::PageCountManifest;
use crate::options::BundleOptions;
use crate::types::*;
use pdf_ingest::{FsHandlers, Handlers, collect_to_fixed_point};
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};

/// What a bundling run produced
#[derive(Debug, Clone)]
pub struct BundleReport {
    /// Group documents in manifest order
    pub groups: Vec<GroupOutput>,
    pub manifest: PageCountManifest,
    pub manifest_path: PathBuf,
    pub combined_path: Option<PathBuf>,
    /// Files no handler recognized
    pub unhandled: Vec<PathBuf>,
    /// Walk passes that discovered something
    pub walk_passes: usize,
}

/// Bundle the export at `root`, expanding and converting through `handlers`
pub fn bundle_with<H: Handlers + ?Sized>(
    root: &Path,
    options: &BundleOptions,
    handlers: &mut H,
) -> Result<BundleReport> {
    options.validate()?;

    let mut options = options.clone();
    std::fs::create_dir_all(&options.output_dir)?;
    // Outputs of an earlier run must not be bundled again
    options.ingest.exclude.push(options.output_dir.clone());

    let outcome = collect_to_fixed_point(root, &options.ingest, handlers)?;
    log::info!(
        "Collected {} PDFs in {} groups after {} passes",
        outcome.groups.file_count(),
        outcome.groups.len(),
        outcome.passes
    );

    let groups = outcome.groups.into_groups();
    if groups.is_empty() {
        return Err(BundleError::NoGroups);
    }

    let mut rng = match options.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    let outputs = concatenate_groups(groups, &options, &mut rng)?;

    let manifest = PageCountManifest::from_counts(
        outputs
            .iter()
            .map(|output| (output.name.clone(), output.page_count)),
    );
    let manifest_path = options.manifest_path();
    manifest.write(&manifest_path)?;
    log::info!(
        "Wrote page counts for {} groups ({} pages) to {}",
        manifest.len(),
        manifest.total_pages(),
        manifest_path.display()
    );

    let combined_path = if options.write_combined {
        let path = options.combined_path();
        combine(&manifest, &options.output_dir, &path)?;
        Some(path)
    } else {
        None
    };

    Ok(BundleReport {
        groups: outputs,
        manifest,
        manifest_path,
        combined_path,
        unhandled: outcome.unhandled,
        walk_passes: outcome.passes,
    })
}

/// Bundle the export at `root` using the filesystem handlers
pub async fn bundle(root: impl AsRef<Path>, options: &BundleOptions) -> Result<BundleReport> {
    let root = root.as_ref().to_owned();
    let options = options.clone();

    tokio::task::spawn_blocking(move || {
        let mut handlers = FsHandlers::new(&options.ingest);
        bundle_with(&root, &options, &mut handlers)
    })
    .await?
}
