use std::path::PathBuf;

use erkas_model::{RegionSummary, SkippedRegion};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Completed,
    /// Interrupted; national outputs exist only with `--finalize-partial`.
    Cancelled,
}

#[derive(Debug)]
pub struct RunResult {
    pub output_dir: PathBuf,
    pub status: RunStatus,
    /// Regions that produced a row, in discovery order.
    pub regions: Vec<RegionRow>,
    pub skipped: Vec<SkippedRegion>,
    /// Files never started or stopped early because of cancellation.
    pub not_processed: usize,
    pub outputs: NationalOutputs,
}

#[derive(Debug)]
pub struct RegionRow {
    pub summary: RegionSummary,
    pub segments: usize,
    pub source_file: PathBuf,
}

/// National artifacts written by the run, if any.
#[derive(Debug, Default)]
pub struct NationalOutputs {
    pub kind_tables: Vec<PathBuf>,
    pub table: Option<PathBuf>,
    pub dataset: Option<PathBuf>,
    pub skip_manifest: Option<PathBuf>,
}
