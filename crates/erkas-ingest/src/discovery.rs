//! Region file discovery.

use std::path::{Path, PathBuf};

use erkas_model::{InputLayout, SourceKind};
use tracing::debug;

use crate::error::{IngestError, Result};

/// A region dataset found under the input root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionFile {
    /// Path to the source file.
    pub path: PathBuf,
    /// Which store reads it.
    pub kind: SourceKind,
    /// File stem, reused for the per-region subset name.
    pub stem: String,
    /// Region token derived from the file name.
    pub region_token: String,
}

impl RegionFile {
    pub fn new(path: PathBuf, kind: SourceKind) -> Self {
        let stem = path
            .file_stem()
            .and_then(|v| v.to_str())
            .unwrap_or("")
            .to_string();
        let region_token = region_token(&stem);
        Self {
            path,
            kind,
            stem,
            region_token,
        }
    }
}

/// Extracts the region token from a file stem.
///
/// Deliveries are named `<program>_<year>_<region>_...`, so the third
/// underscore-separated part is the region. Stems with fewer parts are used
/// as-is.
pub fn region_token(stem: &str) -> String {
    stem.split('_')
        .nth(2)
        .filter(|token| !token.trim().is_empty())
        .unwrap_or(stem)
        .trim()
        .to_string()
}

/// Lists files with the given extension below `dir`, recursively.
///
/// Returns paths sorted lexically.
pub fn list_region_files(dir: &Path, extension: &str) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    let mut pending = vec![dir.to_path_buf()];

    while let Some(current) = pending.pop() {
        let entries = std::fs::read_dir(&current).map_err(|e| IngestError::DirectoryRead {
            path: current.clone(),
            source: e,
        })?;

        for entry_result in entries {
            let entry = entry_result.map_err(|e| IngestError::DirectoryRead {
                path: current.clone(),
                source: e,
            })?;
            let path = entry.path();

            if path.is_dir() {
                pending.push(path);
                continue;
            }

            // Check extension (case-insensitive)
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .map(|ext| ext.eq_ignore_ascii_case(extension))
                .unwrap_or(false);

            if matches {
                files.push(path);
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Discovers region files of every source kind below `root`.
///
/// A missing kind directory contributes no files. The result is ordered by
/// source kind, then lexically by path, which fixes the row order of every
/// summary table.
pub fn discover_region_files(root: &Path, layout: &InputLayout) -> Result<Vec<RegionFile>> {
    if !root.is_dir() {
        return Err(IngestError::DirectoryNotFound {
            path: root.to_path_buf(),
        });
    }

    let mut discovered = Vec::new();
    for kind in SourceKind::ALL {
        let dir = layout.dir_for(root, kind);
        if !dir.is_dir() {
            debug!(kind = %kind, dir = %dir.display(), "source directory absent");
            continue;
        }
        let files = list_region_files(&dir, kind.extension())?;
        debug!(kind = %kind, file_count = files.len(), "discovered region files");
        discovered.extend(files.into_iter().map(|path| RegionFile::new(path, kind)));
    }
    Ok(discovered)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_token() {
        assert_eq!(region_token("ERKAS_2021_ZH"), "ZH");
        assert_eq!(region_token("ERKAS_2021_BE_bereinigt"), "BE");
        assert_eq!(region_token("Basel"), "Basel");
        assert_eq!(region_token("ERKAS_2021"), "ERKAS_2021");
        assert_eq!(region_token("ERKAS_2021__x"), "ERKAS_2021__x");
    }

    #[test]
    fn test_region_file_new() {
        let file = RegionFile::new(
            PathBuf::from("in/csv/ERKAS_2021_SG_v2.csv"),
            SourceKind::Spreadsheet,
        );
        assert_eq!(file.stem, "ERKAS_2021_SG_v2");
        assert_eq!(file.region_token, "SG");
    }
}
