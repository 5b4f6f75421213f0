//! Error types for region processing.

use erkas_ingest::IngestError;
use erkas_model::{Role, SkipCategory, SourceKind};
use thiserror::Error;

/// Errors raised while turning one region dataset into a summary row.
///
/// The first group rejects a single region and lets the run continue; see
/// [`CoreError::skip_category`]. Everything else aborts the run.
#[derive(Debug, Error)]
pub enum CoreError {
    // === Region Rejections ===
    /// No column carries the fragment of a required role.
    #[error("no column matches {role} fragment '{fragment}'")]
    MissingRole { role: Role, fragment: String },

    /// The resolved subset matches neither known schema generation.
    #[error(
        "{kind} dataset resolves {found} columns, expected {legacy} (legacy) or {current} (current)"
    )]
    SchemaMismatch {
        kind: SourceKind,
        found: usize,
        legacy: usize,
        current: usize,
    },

    /// The region column carries more than one distinct value.
    #[error("column '{column}' is not unique: {}", .values.join(", "))]
    AmbiguousRegion { column: String, values: Vec<String> },

    /// The input file could not be read or parsed.
    #[error(transparent)]
    Ingest(#[from] IngestError),

    // === Fatal Errors ===
    /// A non-empty length or classification value is not a number.
    #[error("cannot read '{value}' in column '{column}' (row {row}) as a number")]
    NumericCoercion {
        column: String,
        value: String,
        row: usize,
    },

    /// Writing a region artifact failed.
    #[error("failed to write region artifact: {0}")]
    Output(#[source] IngestError),

    /// Failed DataFrame operation.
    #[error("DataFrame operation failed: {message}")]
    DataFrame { message: String },

    /// The run was cancelled before this region finished.
    #[error("processing cancelled")]
    Cancelled,
}

impl CoreError {
    /// Manifest category for errors that skip the region, `None` for errors
    /// that end the run.
    pub fn skip_category(&self) -> Option<SkipCategory> {
        match self {
            CoreError::MissingRole { .. } => Some(SkipCategory::MissingRole),
            CoreError::SchemaMismatch { .. } => Some(SkipCategory::SchemaMismatch),
            CoreError::AmbiguousRegion { .. } => Some(SkipCategory::AmbiguousRegion),
            CoreError::Ingest(_) => Some(SkipCategory::Unreadable),
            CoreError::NumericCoercion { .. }
            | CoreError::Output(_)
            | CoreError::DataFrame { .. }
            | CoreError::Cancelled => None,
        }
    }

    pub fn is_recoverable(&self) -> bool {
        self.skip_category().is_some()
    }
}

impl From<polars::prelude::PolarsError> for CoreError {
    fn from(err: polars::prelude::PolarsError) -> Self {
        Self::DataFrame {
            message: err.to_string(),
        }
    }
}

/// Result type for region processing.
pub type Result<T> = std::result::Result<T, CoreError>;
