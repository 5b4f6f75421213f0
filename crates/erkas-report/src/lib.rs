//! ERKAS report generation.
//!
//! This crate writes everything the pipeline emits after the per-region
//! stage:
//!
//! - **Summary tables**: one CSV per source kind, canonical column order
//! - **National table**: per-kind tables combined through [`RegionCombiner`]
//! - **National dataset**: region subsets merged by [`merge_datasets`]
//! - **Skip manifest**: every region that produced no row, with the reason

mod combiner;
mod error;
mod manifest;
mod merger;
mod table;

pub use combiner::{CombinerState, RegionCombiner, combine_kind_tables, reindex};
pub use error::{ReportError, Result};
pub use manifest::{prepare_layout, write_skip_manifest};
pub use merger::{merge_artifacts, merge_datasets};
pub use table::{SummaryTable, format_km, summary_row};
