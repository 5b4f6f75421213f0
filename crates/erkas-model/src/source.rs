//! Source kinds and their format tags.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The kind of input a region dataset was read from.
///
/// The two kinds run through the same pipeline but are reported in separate
/// per-kind summary tables before the national combine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Spreadsheet export with a metadata preamble and coordinate columns.
    Spreadsheet,
    /// Geospatial container converted from the INTERLIS exchange format.
    Geo,
}

impl SourceKind {
    /// All kinds in reporting order.
    pub const ALL: [SourceKind; 2] = [SourceKind::Spreadsheet, SourceKind::Geo];

    /// Tag written to the `Format` column.
    pub fn format_tag(self) -> &'static str {
        match self {
            SourceKind::Spreadsheet => "CSV",
            SourceKind::Geo => "XTF",
        }
    }

    /// Short lowercase name used in output file and directory names.
    pub fn slug(self) -> &'static str {
        match self {
            SourceKind::Spreadsheet => "csv",
            SourceKind::Geo => "xtf",
        }
    }

    /// File extension recognized for this kind during discovery.
    pub fn extension(self) -> &'static str {
        match self {
            SourceKind::Spreadsheet => "csv",
            SourceKind::Geo => "geojson",
        }
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format_tag())
    }
}
