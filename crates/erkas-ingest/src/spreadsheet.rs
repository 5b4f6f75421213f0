//! Spreadsheet export reader.
//!
//! Exports carry a metadata preamble above the real header and a row-index
//! artifact as their first column. Point geometry is built from the easting
//! and northing columns.

use std::collections::BTreeMap;
use std::path::Path;

use csv::ReaderBuilder;
use erkas_model::SpreadsheetLayout;
use serde_json::{Map, Value};
use tracing::debug;

use crate::error::{IngestError, Result};
use crate::frame::{Crs, GeoFeature, GeoFrame};
use crate::values::parse_f64;

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    let mut parts = trimmed.split_whitespace();
    let mut normalized = String::new();
    if let Some(first) = parts.next() {
        normalized.push_str(first);
        for part in parts {
            normalized.push(' ');
            normalized.push_str(part);
        }
    }
    normalized
}

fn normalize_cell(raw: &str, null_token: &str) -> Value {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() || trimmed == null_token {
        Value::Null
    } else {
        Value::String(trimmed.to_string())
    }
}

fn is_blank(record: &[String]) -> bool {
    record.iter().all(|value| value.trim().is_empty())
}

/// Makes header names unique by suffixing repeats with `.1`, `.2`, ...
fn dedupe_headers(headers: Vec<String>) -> Vec<String> {
    let mut seen: BTreeMap<String, usize> = BTreeMap::new();
    headers
        .into_iter()
        .map(|name| {
            let count = seen.entry(name.clone()).or_insert(0);
            let unique = if *count == 0 {
                name
            } else {
                format!("{name}.{count}")
            };
            *count += 1;
            unique
        })
        .collect()
}

/// Reads a spreadsheet export into a [`GeoFrame`].
///
/// The header is located by record position, so a preamble row of empty
/// cells still counts. Blank records below the header are ignored. Rows whose
/// coordinates are missing or unparsable are kept without geometry.
pub fn read_spreadsheet(path: &Path, layout: &SpreadsheetLayout, crs: &Crs) -> Result<GeoFrame> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| IngestError::CsvParse {
            path: path.to_path_buf(),
            source,
        })?;
        raw_rows.push(record.iter().map(str::to_string).collect());
    }

    let Some(header_record) = raw_rows.get(layout.header_row) else {
        return Err(IngestError::NoHeaderDetected {
            path: path.to_path_buf(),
            header_row: layout.header_row,
        });
    };
    let headers: Vec<String> = header_record
        .iter()
        .skip(layout.dropped_leading_columns)
        .map(|value| normalize_header(value))
        .collect();
    let headers = dedupe_headers(headers);

    let position = |column: &str| {
        headers
            .iter()
            .position(|name| name == column)
            .ok_or_else(|| IngestError::MissingColumn {
                column: column.to_string(),
                path: path.to_path_buf(),
            })
    };
    let easting_idx = position(&layout.easting_column)?;
    let northing_idx = position(&layout.northing_column)?;

    let mut frame = GeoFrame::new(crs.clone(), headers.clone());
    let mut without_geometry = 0usize;
    let segments = raw_rows
        .iter()
        .skip(layout.header_row + 1 + layout.skipped_rows_after_header)
        .filter(|record| !is_blank(record));
    for record in segments {
        let mut properties = Map::new();
        for (idx, name) in headers.iter().enumerate() {
            let raw = record
                .get(idx + layout.dropped_leading_columns)
                .map(String::as_str)
                .unwrap_or("");
            properties.insert(name.clone(), normalize_cell(raw, &layout.null_token));
        }
        let coordinate = |idx: usize| {
            record
                .get(idx + layout.dropped_leading_columns)
                .map(String::as_str)
                .and_then(parse_f64)
        };
        let geometry = match (coordinate(easting_idx), coordinate(northing_idx)) {
            (Some(easting), Some(northing)) => Some(GeoFeature::point(easting, northing)),
            _ => {
                without_geometry += 1;
                None
            }
        };
        frame.push(GeoFeature {
            properties,
            geometry,
        });
    }

    debug!(
        path = %path.display(),
        columns = frame.columns.len(),
        rows = frame.len(),
        without_geometry,
        "spreadsheet read"
    );
    Ok(frame)
}
