//! Output directory layout.

use std::path::{Path, PathBuf};

use crate::source::SourceKind;

/// Every path the pipeline writes to, derived from one output root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    root: PathBuf,
}

impl OutputLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn regions_dir(&self, kind: SourceKind) -> PathBuf {
        self.root.join("regions").join(kind.slug())
    }

    /// Subset dataset of one region, named after the source file stem.
    pub fn region_subset(&self, kind: SourceKind, stem: &str) -> PathBuf {
        self.regions_dir(kind).join(format!("{stem}.geojson"))
    }

    pub fn tables_dir(&self) -> PathBuf {
        self.root.join("tables")
    }

    pub fn kind_table(&self, kind: SourceKind) -> PathBuf {
        self.tables_dir().join(format!("summary_{}.csv", kind.slug()))
    }

    pub fn national_dir(&self) -> PathBuf {
        self.root.join("national")
    }

    pub fn national_table(&self) -> PathBuf {
        self.national_dir().join("national_summary.csv")
    }

    pub fn national_dataset(&self) -> PathBuf {
        self.national_dir().join("national_segments.geojson")
    }

    pub fn skip_manifest(&self) -> PathBuf {
        self.national_dir().join("skipped_regions.json")
    }

    /// All directories that must exist before any component writes.
    pub fn directories(&self) -> Vec<PathBuf> {
        let mut dirs: Vec<PathBuf> = SourceKind::ALL
            .iter()
            .map(|kind| self.regions_dir(*kind))
            .collect();
        dirs.push(self.tables_dir());
        dirs.push(self.national_dir());
        dirs
    }
}
