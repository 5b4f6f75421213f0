//! Skipped-region manifest entries.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::source::SourceKind;

/// Why a region produced no summary row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipCategory {
    SchemaMismatch,
    MissingRole,
    AmbiguousRegion,
    Unreadable,
    /// Another file of the same kind and stem was discovered first.
    DuplicateStem,
}

/// One skipped region file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedRegion {
    pub source_file: PathBuf,
    pub region: String,
    pub source_kind: SourceKind,
    pub category: SkipCategory,
    pub reason: String,
}
