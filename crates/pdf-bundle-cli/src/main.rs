mod logger;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, Subcommand};
use logger::CliLogger;
use pdf_bundle::constants::{DEFAULT_SPLIT_DIR, DEFAULT_SPLIT_SUFFIX};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "pdfb",
    about = "Bundle submission exports into watermarked PDFs and split graded ones",
    version
)]
struct Cli {
    /// More output (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Only print warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge each submission group into one watermarked PDF and write page counts
    Bundle {
        /// Unpacked export directory
        export_dir: PathBuf,

        /// Directory for group PDFs and the manifest
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Directory levels below the export root that make up a group
        #[arg(long)]
        group_depth: Option<usize>,

        /// Seed for the watermark colors
        #[arg(long)]
        seed: Option<u64>,

        /// Also write all groups into one PDF
        #[arg(long)]
        combined: bool,

        /// Skip the per-page group stamp
        #[arg(long)]
        no_watermark: bool,

        /// JSON options file; flags override its values
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Cut a graded PDF back into one file per group
    Split {
        /// Graded concatenation of all groups
        graded: PathBuf,

        /// Page-count manifest written by `bundle`
        manifest: PathBuf,

        /// Directory for the split files
        #[arg(short, long, default_value = DEFAULT_SPLIT_DIR)]
        output_dir: PathBuf,

        /// Appended to each group name
        #[arg(long, default_value = DEFAULT_SPLIT_SUFFIX)]
        suffix: String,

        /// Split even if the page count disagrees with the manifest
        #[arg(long)]
        allow_misaligned: bool,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let logger = CliLogger::new(CliLogger::level_for(cli.verbose, cli.quiet), 100)
        .init()
        .context("Failed to install logger")?;

    match cli.command {
        Commands::Bundle {
            export_dir,
            output_dir,
            group_depth,
            seed,
            combined,
            no_watermark,
            config,
        } => {
            let mut options = match &config {
                Some(path) => pdf_bundle::BundleOptions::load(path)
                    .await
                    .with_context(|| format!("Failed to load options from {}", path.display()))?,
                None => pdf_bundle::BundleOptions::default(),
            };
            if let Some(output_dir) = output_dir {
                options.output_dir = output_dir;
            }
            if let Some(group_depth) = group_depth {
                options.ingest.group_depth = group_depth;
            }
            if seed.is_some() {
                options.seed = seed;
            }
            options.write_combined |= combined;
            if no_watermark {
                options.watermark.enabled = false;
            }

            let report = pdf_bundle::bundle(&export_dir, &options)
                .await
                .with_context(|| format!("Failed to bundle {}", export_dir.display()))?;

            println!(
                "Bundled {} groups ({} pages) → {}",
                report.groups.len(),
                report.manifest.total_pages(),
                options.output_dir.display()
            );
            for group in &report.groups {
                println!("  {:<32} {:>4} pages", group.name, group.page_count);
            }
            println!("Page counts → {}", report.manifest_path.display());
            if let Some(path) = &report.combined_path {
                println!("Combined → {}", path.display());
            }
            if !report.unhandled.is_empty() {
                println!("Skipped {} unrecognized files", report.unhandled.len());
            }
        }

        Commands::Split {
            graded,
            manifest,
            output_dir,
            suffix,
            allow_misaligned,
        } => {
            let options = pdf_bundle::SplitOptions {
                output_dir,
                suffix,
                allow_misaligned,
            };

            let report = pdf_bundle::split(&graded, &manifest, &options)
                .await
                .with_context(|| format!("Failed to split {}", graded.display()))?;

            println!(
                "Split {} pages into {} files → {}",
                report.graded_pages,
                report.outputs.len(),
                options.output_dir.display()
            );
        }
    }

    let warnings = logger.warnings();
    if !warnings.is_empty() {
        eprintln!("{} warning(s), see above", warnings.len());
    }

    Ok(())
}
