//! Error types for report generation.

use std::path::PathBuf;

use erkas_ingest::IngestError;
use thiserror::Error;

use crate::combiner::CombinerState;

/// Errors that can occur while writing tables, combining, or merging.
#[derive(Debug, Error)]
pub enum ReportError {
    // === File System Errors ===
    /// Failed to create an output directory.
    #[error("failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to write file.
    #[error("failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // === Table Errors ===
    /// Failed to read or write a CSV table.
    #[error("CSV error in {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    /// Failed to serialize the manifest.
    #[error("JSON error in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    // === Combine and Merge Errors ===
    /// The combiner does not accept this operation in its current state.
    #[error("cannot {action} a {state:?} combiner")]
    InvalidTransition {
        state: CombinerState,
        action: &'static str,
    },

    /// No region artifact to merge.
    #[error("no region datasets to merge")]
    EmptyMergeSet,

    /// Reading or writing a geospatial artifact failed.
    #[error(transparent)]
    Ingest(#[from] IngestError),
}

/// Result type for report operations.
pub type Result<T> = std::result::Result<T, ReportError>;
