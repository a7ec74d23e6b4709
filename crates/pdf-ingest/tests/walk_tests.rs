use pdf_ingest::*;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Handlers that pretend to expand archives by writing a scripted list of files
#[derive(Default)]
struct ScriptedHandlers {
    contents: HashMap<String, Vec<&'static str>>,
    expanded: Vec<PathBuf>,
    converted: Vec<PathBuf>,
    regenerating: usize,
}

impl ScriptedHandlers {
    fn with_archive(mut self, name: &str, files: Vec<&'static str>) -> Self {
        self.contents.insert(name.to_string(), files);
        self
    }
}

impl Handlers for ScriptedHandlers {
    fn expand_archive(
        &mut self,
        archive: &Path,
        _format: ArchiveFormat,
        dest: &Path,
    ) -> pdf_ingest::Result<()> {
        self.expanded.push(archive.to_path_buf());
        let name = archive.file_name().unwrap().to_string_lossy().into_owned();

        if name.starts_with("loop") {
            self.regenerating += 1;
            fs::write(dest.join(format!("loop{}.zip", self.regenerating)), b"zip").unwrap();
            return Ok(());
        }

        for file in self.contents.get(&name).cloned().unwrap_or_default() {
            let path = dest.join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, b"data").unwrap();
        }
        Ok(())
    }

    fn convert_image(
        &mut self,
        image: &Path,
        _format: ImageFormat,
    ) -> pdf_ingest::Result<PathBuf> {
        self.converted.push(image.to_path_buf());
        let target = image.with_extension("pdf");
        fs::write(&target, b"%PDF").unwrap();
        Ok(target)
    }
}

fn touch(root: &Path, rel: &str) -> PathBuf {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, b"data").unwrap();
    path
}

#[test]
fn test_flat_tree_needs_one_pass() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "alice/a.pdf");
    touch(dir.path(), "bob/b.pdf");

    let mut handlers = ScriptedHandlers::default();
    let outcome =
        collect_to_fixed_point(dir.path(), &IngestOptions::default(), &mut handlers).unwrap();

    assert_eq!(outcome.passes, 1);
    assert_eq!(outcome.ignored.len(), 2);
    assert_eq!(outcome.groups.len(), 2);
    assert_eq!(outcome.groups.file_count(), 2);
}

#[test]
fn test_nested_archives_reach_fixed_point() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "alice/outer.zip");

    let mut handlers = ScriptedHandlers::default()
        .with_archive("outer.zip", vec!["inner.zip", "a.pdf"])
        .with_archive("inner.zip", vec!["deep/b.pdf"]);

    let outcome =
        collect_to_fixed_point(dir.path(), &IngestOptions::default(), &mut handlers).unwrap();

    // Nesting depth 2 -> 3 productive passes
    assert_eq!(outcome.passes, 3);
    assert_eq!(handlers.expanded.len(), 2);

    let root = fs::canonicalize(dir.path()).unwrap();
    let mut seen: Vec<PathBuf> = outcome.ignored.iter().map(Path::to_path_buf).collect();
    seen.sort();
    assert_eq!(
        seen,
        vec![
            root.join("alice/a.pdf"),
            root.join("alice/deep/b.pdf"),
            root.join("alice/inner.zip"),
            root.join("alice/outer.zip"),
        ]
    );

    let groups = outcome.groups.into_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "alice");
    assert_eq!(groups[0].files.len(), 2);
}

#[test]
fn test_ignored_paths_never_reach_handlers() {
    let dir = tempfile::tempdir().unwrap();
    let root = fs::canonicalize(dir.path()).unwrap();
    let archive = touch(&root, "alice/outer.zip");
    let image = touch(&root, "alice/scan.png");

    let mut ignore = IgnoreSet::new();
    ignore.insert(archive);
    ignore.insert(image);

    let mut handlers = ScriptedHandlers::default().with_archive("outer.zip", vec!["x.pdf"]);
    let mut groups = SubmissionGroups::new(&root, 1);

    let touched = walk_pass(
        &root,
        &IngestOptions::default(),
        &ignore,
        &mut handlers,
        &mut groups,
    )
    .unwrap();

    assert!(touched.is_empty());
    assert!(handlers.expanded.is_empty());
    assert!(handlers.converted.is_empty());
    assert!(groups.is_empty());
}

#[test]
fn test_images_are_converted_then_collected() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "carol/photo.JPG");

    let mut handlers = ScriptedHandlers::default();
    let outcome =
        collect_to_fixed_point(dir.path(), &IngestOptions::default(), &mut handlers).unwrap();

    assert_eq!(handlers.converted.len(), 1);
    assert_eq!(outcome.passes, 2);
    let groups = outcome.groups.into_groups();
    assert_eq!(groups[0].name, "carol");
    assert_eq!(
        groups[0].files[0].file_name().unwrap().to_string_lossy(),
        "photo.pdf"
    );
}

#[test]
fn test_unhandled_files_are_recorded_once() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "alice/notes.txt");
    touch(dir.path(), "alice/outer.zip");

    let mut handlers = ScriptedHandlers::default().with_archive("outer.zip", vec!["a.pdf"]);
    let outcome =
        collect_to_fixed_point(dir.path(), &IngestOptions::default(), &mut handlers).unwrap();

    assert_eq!(outcome.unhandled.len(), 1);
    assert!(outcome.unhandled[0].ends_with("alice/notes.txt"));
    assert_eq!(outcome.passes, 2);
}

#[test]
fn test_self_regenerating_archive_hits_pass_limit() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "alice/loop0.zip");

    let options = IngestOptions {
        max_passes: 5,
        ..Default::default()
    };
    let mut handlers = ScriptedHandlers::default();
    let result = collect_to_fixed_point(dir.path(), &options, &mut handlers);

    match result {
        Err(IngestError::FixedPointNotReached { passes, .. }) => assert_eq!(passes, 5),
        other => panic!("Expected FixedPointNotReached, got {:?}", other.map(|o| o.passes)),
    }
}

#[test]
fn test_pass_limit_counts_only_discovering_passes() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "alice/a.pdf");

    let options = IngestOptions {
        max_passes: 1,
        ..Default::default()
    };
    let outcome =
        collect_to_fixed_point(dir.path(), &options, &mut ScriptedHandlers::default()).unwrap();
    assert_eq!(outcome.passes, 1);
}

#[test]
fn test_pass_limit_of_nesting_depth_plus_one_suffices() {
    let nested = || {
        ScriptedHandlers::default()
            .with_archive("outer.zip", vec!["inner.zip", "a.pdf"])
            .with_archive("inner.zip", vec!["deep/b.pdf"])
    };

    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "alice/outer.zip");
    let options = IngestOptions {
        max_passes: 3,
        ..Default::default()
    };
    let outcome = collect_to_fixed_point(dir.path(), &options, &mut nested()).unwrap();
    assert_eq!(outcome.passes, 3);

    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "alice/outer.zip");
    let options = IngestOptions {
        max_passes: 2,
        ..Default::default()
    };
    assert!(matches!(
        collect_to_fixed_point(dir.path(), &options, &mut nested()),
        Err(IngestError::FixedPointNotReached { passes: 2, .. })
    ));
}

#[test]
fn test_excluded_directories_are_pruned() {
    let dir = tempfile::tempdir().unwrap();
    touch(dir.path(), "alice/a.pdf");
    touch(dir.path(), "gen/alice.pdf");

    let options = IngestOptions {
        exclude: vec![dir.path().join("gen")],
        ..Default::default()
    };
    let mut handlers = ScriptedHandlers::default();
    let outcome = collect_to_fixed_point(dir.path(), &options, &mut handlers).unwrap();

    let groups = outcome.groups.into_groups();
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].name, "alice");
}

#[test]
fn test_invalid_options_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let options = IngestOptions {
        group_depth: 0,
        ..Default::default()
    };
    let mut handlers = ScriptedHandlers::default();
    assert!(matches!(
        collect_to_fixed_point(dir.path(), &options, &mut handlers),
        Err(IngestError::Config(_))
    ));
}
