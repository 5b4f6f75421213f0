//! Tests for region file discovery.

use std::fs;
use std::path::{Path, PathBuf};

use erkas_ingest::{IngestError, discover_region_files, list_region_files};
use erkas_model::{InputLayout, SourceKind};

fn touch(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent");
    }
    fs::write(&path, "x").expect("write file");
    path
}

#[test]
fn discovers_both_kinds_in_order() {
    let dir = tempfile::tempdir().expect("temp dir");
    let root = dir.path();
    touch(root, "xtf/ERKAS_2021_ZH.geojson");
    touch(root, "xtf/nested/ERKAS_2021_AG.geojson");
    touch(root, "xtf/ERKAS_2021_ZH.gpkg");
    touch(root, "csv/ERKAS_2021_TI.csv");
    touch(root, "csv/ERKAS_2021_BE.CSV");
    touch(root, "csv/notes.txt");

    let files = discover_region_files(root, &InputLayout::default()).expect("discover");
    let summary: Vec<(SourceKind, &str)> = files
        .iter()
        .map(|file| (file.kind, file.region_token.as_str()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (SourceKind::Spreadsheet, "BE"),
            (SourceKind::Spreadsheet, "TI"),
            (SourceKind::Geo, "ZH"),
            (SourceKind::Geo, "AG"),
        ]
    );
}

#[test]
fn missing_kind_directory_is_empty() {
    let dir = tempfile::tempdir().expect("temp dir");
    touch(dir.path(), "csv/ERKAS_2021_UR.csv");

    let files = discover_region_files(dir.path(), &InputLayout::default()).expect("discover");
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].kind, SourceKind::Spreadsheet);
}

#[test]
fn missing_root_is_an_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let result = discover_region_files(&dir.path().join("absent"), &InputLayout::default());
    assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));

    let result = list_region_files(&dir.path().join("absent"), "csv");
    assert!(matches!(result, Err(IngestError::DirectoryNotFound { .. })));
}
