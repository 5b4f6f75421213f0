//! Skipped-region manifest and output directory setup.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use erkas_model::{OutputLayout, SkippedRegion};
use tracing::debug;

use crate::error::{ReportError, Result};

/// Creates every output directory. Safe to call on an existing layout.
pub fn prepare_layout(layout: &OutputLayout) -> Result<()> {
    for dir in layout.directories() {
        fs::create_dir_all(&dir).map_err(|source| ReportError::CreateDir {
            path: dir.clone(),
            source,
        })?;
    }
    debug!(root = %layout.root().display(), "output layout ready");
    Ok(())
}

/// Writes the skipped regions as a pretty-printed JSON array.
pub fn write_skip_manifest(path: &Path, skipped: &[SkippedRegion]) -> Result<()> {
    let write_error = |source: std::io::Error| ReportError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, skipped).map_err(|source| ReportError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.write_all(b"\n").map_err(write_error)?;
    writer.flush().map_err(write_error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use erkas_model::{SkipCategory, SourceKind};
    use std::path::PathBuf;

    #[test]
    fn test_prepare_layout_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = OutputLayout::new(dir.path().join("out"));
        prepare_layout(&layout).unwrap();
        prepare_layout(&layout).unwrap();
        for path in layout.directories() {
            assert!(path.is_dir(), "{}", path.display());
        }
    }

    #[test]
    fn test_write_skip_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skipped_regions.json");
        let skipped = vec![SkippedRegion {
            source_file: PathBuf::from("xtf/ERKAS_2021_VS.geojson"),
            region: "VS".to_string(),
            source_kind: SourceKind::Geo,
            category: SkipCategory::SchemaMismatch,
            reason: "XTF dataset resolves 7 columns, expected 5 (legacy) or 6 (current)".to_string(),
        }];
        write_skip_manifest(&path, &skipped).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["region"], "VS");
        assert_eq!(value[0]["source_kind"], "geo");
        assert_eq!(value[0]["category"], "schema_mismatch");
        assert!(text.ends_with("]\n"));
    }

    #[test]
    fn test_empty_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skipped_regions.json");
        write_skip_manifest(&path, &[]).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]\n");
    }
}
