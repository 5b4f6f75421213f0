//! The tabular/geo store seam.

use std::path::Path;

use erkas_model::{PipelineConfig, SourceKind, SpreadsheetLayout};

use crate::discovery::RegionFile;
use crate::error::Result;
use crate::frame::{Crs, GeoFrame};
use crate::geojson::{read_geojson, write_geojson};
use crate::spreadsheet::read_spreadsheet;

/// Loads region datasets and persists geospatial artifacts.
///
/// Implementations must be shareable across worker threads.
pub trait GeoStore: Send + Sync {
    /// Loads a discovered region file, whatever its source kind.
    fn load_region(&self, file: &RegionFile) -> Result<GeoFrame>;

    /// Reads a previously written artifact.
    fn read_dataset(&self, path: &Path) -> Result<GeoFrame>;

    /// Writes a dataset artifact, replacing any existing file.
    fn write_dataset(&self, path: &Path, frame: &GeoFrame) -> Result<()>;
}

/// File-system store: spreadsheet CSV and GeoJSON in, GeoJSON out.
#[derive(Debug, Clone)]
pub struct FileStore {
    spreadsheet: SpreadsheetLayout,
    crs: Crs,
}

impl FileStore {
    pub fn new(spreadsheet: SpreadsheetLayout, crs: Crs) -> Self {
        Self { spreadsheet, crs }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.spreadsheet.clone(), Crs::parse(&config.crs))
    }
}

impl GeoStore for FileStore {
    fn load_region(&self, file: &RegionFile) -> Result<GeoFrame> {
        match file.kind {
            SourceKind::Spreadsheet => read_spreadsheet(&file.path, &self.spreadsheet, &self.crs),
            SourceKind::Geo => read_geojson(&file.path, &self.crs),
        }
    }

    fn read_dataset(&self, path: &Path) -> Result<GeoFrame> {
        read_geojson(path, &self.crs)
    }

    fn write_dataset(&self, path: &Path, frame: &GeoFrame) -> Result<()> {
        write_geojson(path, frame)
    }
}
