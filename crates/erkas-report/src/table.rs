//! Summary tables.
//!
//! Tables are plain headers plus text rows so that per-kind tables and the
//! national table are written byte-for-byte the same way.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use erkas_ingest::format_numeric;
use erkas_model::columns::canonical_columns;
use erkas_model::{ClassificationFamily, FamilySummary, RegionSummary};

use crate::error::{ReportError, Result};

/// Decimal places kept for kilometer values.
const KM_DECIMALS: i32 = 6;

/// A table of text cells with named columns.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SummaryTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Formats a kilometer value rounded to six decimals, without trailing zeros.
pub fn format_km(value: f64) -> String {
    let scale = 10f64.powi(KM_DECIMALS);
    let rounded = (value * scale).round() / scale;
    // Avoid printing "-0".
    let rounded = if rounded == 0.0 { 0.0 } else { rounded };
    format_numeric(rounded)
}

fn family_cells(family: &FamilySummary, cells: &mut Vec<String>) {
    cells.push(format_km(family.not_yet_assessed_km));
    cells.push(format_km(family.assessed_km));
    for code in family.codes {
        cells.push(code.map(format_km).unwrap_or_default());
    }
}

/// Renders a summary in canonical column order.
pub fn summary_row(summary: &RegionSummary) -> Vec<String> {
    let mut cells = vec![
        summary.region.clone(),
        summary.source_kind.format_tag().to_string(),
        summary.interval.to_string(),
        format_km(summary.total_km),
        format_km(summary.exempted_km),
    ];
    for family in ClassificationFamily::ALL {
        family_cells(summary.family(family), &mut cells);
    }
    cells
}

impl SummaryTable {
    pub fn new(headers: Vec<String>) -> Self {
        Self {
            headers,
            rows: Vec::new(),
        }
    }

    /// Canonical table of the given summaries, in the given order.
    pub fn from_summaries<'a>(summaries: impl IntoIterator<Item = &'a RegionSummary>) -> Self {
        Self {
            headers: canonical_columns(),
            rows: summaries.into_iter().map(summary_row).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell of a row by column name.
    pub fn cell(&self, row: usize, column: &str) -> Option<&str> {
        let idx = self.headers.iter().position(|header| header == column)?;
        self.rows.get(row)?.get(idx).map(String::as_str)
    }

    /// Writes the table as comma-separated UTF-8.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let csv_error = |source: csv::Error| ReportError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(|source| ReportError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
        let mut writer = WriterBuilder::new().from_writer(BufWriter::new(file));
        writer.write_record(&self.headers).map_err(csv_error)?;
        for row in &self.rows {
            writer.write_record(row).map_err(csv_error)?;
        }
        let mut inner = writer
            .into_inner()
            .map_err(|err| ReportError::FileWrite {
                path: path.to_path_buf(),
                source: err.into_error(),
            })?;
        inner.flush().map_err(|source| ReportError::FileWrite {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(())
    }

    /// Reads a table written by [`SummaryTable::write_csv`]. Short rows are
    /// padded with empty cells.
    pub fn read_csv(path: &Path) -> Result<Self> {
        let csv_error = |source: csv::Error| ReportError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(csv_error)?;
        let headers: Vec<String> = reader
            .headers()
            .map_err(csv_error)?
            .iter()
            .map(|value| value.trim_matches('\u{feff}').to_string())
            .collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len().max(row.len()), String::new());
            rows.push(row);
        }
        Ok(Self { headers, rows })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erkas_model::{ComputationInterval, SourceKind};

    #[test]
    fn test_format_km() {
        assert_eq!(format_km(6.0), "6");
        assert_eq!(format_km(1.5), "1.5");
        assert_eq!(format_km(0.1 + 0.2), "0.3");
        assert_eq!(format_km(1.23456789), "1.234568");
        assert_eq!(format_km(-0.0000001), "0");
        assert_eq!(format_km(120.0), "120");
    }

    #[test]
    fn test_summary_row() {
        let summary = RegionSummary {
            region: "BE".to_string(),
            source_kind: SourceKind::Geo,
            interval: ComputationInterval::Variable,
            total_km: 2.0,
            exempted_km: 0.0,
            pers: FamilySummary {
                codes: [Some(0.5), Some(1.5), None, None, None, None],
                assessed_km: 1.5,
                not_yet_assessed_km: 0.5,
            },
            ofg: FamilySummary::default(),
            gw: FamilySummary::default(),
        };
        let row = summary_row(&summary);
        assert_eq!(row.len(), canonical_columns().len());
        assert_eq!(&row[..9], ["BE", "XTF", "variabel", "2", "0", "0.5", "1.5", "0.5", "1.5"]);
        assert_eq!(row[9], "");
    }

    #[test]
    fn test_write_and_read() {
        let mut table = SummaryTable::new(vec!["Kanton".to_string(), "Durchgangsstrasse [km]".to_string()]);
        table.rows.push(vec!["ZH".to_string(), "6".to_string()]);
        table.rows.push(vec!["TI, Süd".to_string(), String::new()]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");
        table.write_csv(&path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text, "Kanton,Durchgangsstrasse [km]\nZH,6\n\"TI, Süd\",\n");

        let read = SummaryTable::read_csv(&path).unwrap();
        assert_eq!(read, table);
        assert_eq!(read.cell(0, "Durchgangsstrasse [km]"), Some("6"));
    }
}
