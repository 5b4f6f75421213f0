//! National dataset merge.

use std::path::PathBuf;

use erkas_ingest::{GeoFrame, GeoStore};
use tracing::{info, warn};

use crate::error::{ReportError, Result};

/// Concatenates region datasets in the given order.
///
/// The result carries the CRS of the first dataset. Columns are the union
/// of all columns in order of first appearance. Datasets with a different
/// CRS are merged as-is with a warning.
pub fn merge_datasets(frames: impl IntoIterator<Item = GeoFrame>) -> Result<GeoFrame> {
    let mut frames = frames.into_iter();
    let Some(mut merged) = frames.next() else {
        return Err(ReportError::EmptyMergeSet);
    };
    let mut count = 1usize;
    for frame in frames {
        count += 1;
        if frame.crs != merged.crs {
            warn!(
                expected = %merged.crs,
                found = %frame.crs,
                "merging dataset with a different CRS without reprojection"
            );
        }
        for column in frame.columns {
            if !merged.columns.contains(&column) {
                merged.columns.push(column);
            }
        }
        merged.features.extend(frame.features);
    }
    info!(datasets = count, features = merged.len(), "datasets merged");
    Ok(merged)
}

/// Reads the region artifacts through `store` and merges them.
pub fn merge_artifacts(store: &dyn GeoStore, paths: &[PathBuf]) -> Result<GeoFrame> {
    if paths.is_empty() {
        return Err(ReportError::EmptyMergeSet);
    }
    let frames = paths
        .iter()
        .map(|path| store.read_dataset(path))
        .collect::<std::result::Result<Vec<_>, _>>()?;
    merge_datasets(frames)
}
