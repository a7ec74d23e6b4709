use lopdf::{Dictionary, Document, Object, ObjectId, Stream};
use pdf_bundle::*;
use std::path::Path;

/// A graded document with `num_pages` pages, each showing "page N"
fn create_test_pdf(num_pages: usize) -> Document {
    let mut doc = Document::with_version("1.7");
    let pages_id = doc.new_object_id();

    let mut kids = Vec::new();
    for n in 1..=num_pages {
        let content = format!("BT /F1 12 Tf 72 720 Td (page {}) Tj ET", n);
        let content_id = doc.add_object(Stream::new(Dictionary::new(), content.into_bytes()));
        let page_id = doc.add_object(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Page".to_vec())),
            ("Parent", Object::Reference(pages_id)),
            (
                "MediaBox",
                Object::Array(vec![
                    Object::Integer(0),
                    Object::Integer(0),
                    Object::Integer(612),
                    Object::Integer(792),
                ]),
            ),
            ("Resources", Object::Dictionary(Dictionary::new())),
            ("Contents", Object::Reference(content_id)),
        ]));
        kids.push(Object::Reference(page_id));
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(Dictionary::from_iter(vec![
            ("Type", Object::Name(b"Pages".to_vec())),
            ("Kids", Object::Array(kids)),
            ("Count", Object::Integer(num_pages as i64)),
        ])),
    );

    let catalog_id = doc.add_object(Dictionary::from_iter(vec![
        ("Type", Object::Name(b"Catalog".to_vec())),
        ("Pages", Object::Reference(pages_id)),
    ]));
    doc.trailer.set("Root", catalog_id);

    doc
}

/// Marker text of every page of the PDF at `path`
fn page_markers(path: &Path) -> Vec<String> {
    let doc = Document::load(path).unwrap();
    let ids: Vec<ObjectId> = doc.get_pages().values().copied().collect();
    ids.into_iter()
        .map(|id| {
            let content_id = doc
                .get_dictionary(id)
                .unwrap()
                .get(b"Contents")
                .unwrap()
                .as_reference()
                .unwrap();
            let stream = doc.get_object(content_id).unwrap().as_stream().unwrap();
            let text = String::from_utf8_lossy(&stream.content).into_owned();
            let start = text.find('(').unwrap() + 1;
            let end = text.find(')').unwrap();
            text[start..end].to_string()
        })
        .collect()
}

fn options_in(dir: &Path) -> SplitOptions {
    SplitOptions {
        output_dir: dir.join("split"),
        ..Default::default()
    }
}

#[test]
fn test_split_follows_manifest_counts() {
    let dir = tempfile::tempdir().unwrap();
    let graded = create_test_pdf(5);
    let manifest = PageCountManifest::from_counts([("bob", 2), ("alice", 3)]);

    let report = split_document(&graded, &manifest, &options_in(dir.path())).unwrap();

    assert_eq!(report.graded_pages, 5);
    assert_eq!(report.outputs.len(), 2);

    let alice = &report.outputs[0];
    assert_eq!(alice.name, "alice");
    assert_eq!(alice.first_page, 0);
    assert_eq!(alice.path, dir.path().join("split/alice_corrected.pdf"));
    assert_eq!(page_markers(&alice.path), vec!["page 1", "page 2", "page 3"]);

    let bob = &report.outputs[1];
    assert_eq!(bob.first_page, 3);
    assert_eq!(page_markers(&bob.path), vec!["page 4", "page 5"]);
}

#[test]
fn test_page_count_mismatch_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let graded = create_test_pdf(4);
    let manifest = PageCountManifest::from_counts([("alice", 3), ("bob", 2)]);

    let result = split_document(&graded, &manifest, &options_in(dir.path()));

    match result {
        Err(BundleError::ManifestMisalignment { expected, actual }) => {
            assert_eq!(expected, 5);
            assert_eq!(actual, 4);
        }
        other => panic!("Expected ManifestMisalignment, got {:?}", other),
    }
    assert!(!dir.path().join("split/alice_corrected.pdf").exists());
}

#[test]
fn test_allowed_mismatch_clamps_ranges() {
    let dir = tempfile::tempdir().unwrap();
    let graded = create_test_pdf(4);
    let manifest = PageCountManifest::from_counts([("alice", 3), ("bob", 2), ("carol", 1)]);
    let options = SplitOptions {
        allow_misaligned: true,
        ..options_in(dir.path())
    };

    let report = split_document(&graded, &manifest, &options).unwrap();

    let names: Vec<&str> = report.outputs.iter().map(|o| o.name.as_str()).collect();
    assert_eq!(names, vec!["alice", "bob"]);
    assert_eq!(report.outputs[1].page_count, 1);
    assert_eq!(page_markers(&report.outputs[1].path), vec!["page 4"]);
}

#[test]
fn test_custom_suffix() {
    let dir = tempfile::tempdir().unwrap();
    let graded = create_test_pdf(1);
    let manifest = PageCountManifest::from_counts([("alice", 1)]);
    let options = SplitOptions {
        suffix: "_graded".to_string(),
        ..options_in(dir.path())
    };

    let report = split_document(&graded, &manifest, &options).unwrap();
    assert_eq!(
        report.outputs[0].path,
        dir.path().join("split/alice_graded.pdf")
    );
}

#[test]
fn test_suffix_with_separator_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let options = SplitOptions {
        suffix: "/../escape".to_string(),
        ..options_in(dir.path())
    };
    let manifest = PageCountManifest::from_counts([("alice", 1)]);

    assert!(matches!(
        split_document(&create_test_pdf(1), &manifest, &options),
        Err(BundleError::Config(_))
    ));
}

#[test]
fn test_manifest_name_cannot_leave_output_dir() {
    let dir = tempfile::tempdir().unwrap();
    let manifest = PageCountManifest::from_yaml("alice: 1\n../escape: 1\n").unwrap();

    let result = split_document(&create_test_pdf(2), &manifest, &options_in(dir.path()));

    match result {
        Err(BundleError::InvalidGroupName(name)) => assert_eq!(name, "../escape"),
        other => panic!("Expected InvalidGroupName, got {:?}", other),
    }
    assert!(!dir.path().join("split").exists());
    assert!(!dir.path().join("escape_corrected.pdf").exists());
}

#[tokio::test]
async fn test_split_from_files_uses_stored_order() {
    let dir = tempfile::tempdir().unwrap();
    let graded_path = dir.path().join("graded.pdf");
    create_test_pdf(3).save(&graded_path).unwrap();

    // Hand-written flat manifest, deliberately not in alphabetical order
    let manifest_path = dir.path().join("page_counts.yaml");
    std::fs::write(&manifest_path, "zoe: 1\nadam: 2\n").unwrap();

    let report = split(&graded_path, &manifest_path, &options_in(dir.path()))
        .await
        .unwrap();

    assert_eq!(report.outputs[0].name, "zoe");
    assert_eq!(page_markers(&report.outputs[0].path), vec!["page 1"]);
    assert_eq!(page_markers(&report.outputs[1].path), vec!["page 2", "page 3"]);
}
