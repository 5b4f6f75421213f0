//! Region-wide attributes read from segment columns.
//!
//! Shared attributes are never read off the first row. The distinct values
//! of the column are collected and must be unique before one is taken.

use std::collections::BTreeSet;

use erkas_ingest::{format_numeric, parse_f64};
use erkas_model::{ComputationInterval, VARIABLE_INTERVAL};
use polars::prelude::{Column, DataFrame, DataType};
use tracing::warn;

use crate::error::{CoreError, Result};

/// Distinct non-empty values of a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UniqueValue {
    /// No value at all.
    Absent,
    Unique(String),
    /// Sorted distinct values.
    Conflicting(Vec<String>),
}

/// Collects the distinct trimmed, non-empty values.
pub fn unique_value<I, S>(values: I) -> UniqueValue
where
    I: IntoIterator<Item = Option<S>>,
    S: AsRef<str>,
{
    let distinct: BTreeSet<String> = values
        .into_iter()
        .flatten()
        .map(|value| value.as_ref().trim().to_string())
        .filter(|value| !value.is_empty())
        .collect();
    let mut iter = distinct.into_iter();
    match (iter.next(), iter.next()) {
        (None, _) => UniqueValue::Absent,
        (Some(value), None) => UniqueValue::Unique(value),
        (Some(first), Some(second)) => {
            let mut values = vec![first, second];
            values.extend(iter);
            UniqueValue::Conflicting(values)
        }
    }
}

fn column_values(column: &Column) -> Result<Vec<Option<String>>> {
    let column = column.cast(&DataType::String)?;
    Ok(column
        .str()?
        .iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

fn find_column<'a>(df: &'a DataFrame, name: &str) -> Option<&'a Column> {
    df.get_columns()
        .iter()
        .find(|column| column.name().as_str().eq_ignore_ascii_case(name))
}

/// Region identifier: the unique value of `column` when present, the file
/// name token otherwise.
pub fn resolve_region(df: &DataFrame, column: &str, file_token: &str) -> Result<String> {
    let Some(region_column) = find_column(df, column) else {
        return Ok(file_token.to_string());
    };
    match unique_value(column_values(region_column)?) {
        UniqueValue::Absent => Ok(file_token.to_string()),
        UniqueValue::Unique(region) => {
            if region != file_token {
                warn!(
                    region = %region,
                    file_token = %file_token,
                    "region column overrides file name token"
                );
            }
            Ok(region)
        }
        UniqueValue::Conflicting(values) => Err(CoreError::AmbiguousRegion {
            column: region_column.name().to_string(),
            values,
        }),
    }
}

/// Parses one interval cell. `variabel` maps to [`ComputationInterval::Variable`].
pub fn parse_interval(raw: &str) -> Option<ComputationInterval> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case(VARIABLE_INTERVAL) {
        return Some(ComputationInterval::Variable);
    }
    parse_f64(trimmed).map(ComputationInterval::Fixed)
}

/// Region computation interval.
///
/// One distinct value gives that value, several give `variabel`, none (or no
/// interval column) gives unknown. Cells that are neither numeric nor
/// `variabel` are ignored with a warning.
pub fn resolve_interval(df: &DataFrame, column: Option<&str>) -> Result<ComputationInterval> {
    let Some(column) = column else {
        return Ok(ComputationInterval::Unknown);
    };
    let mut ignored = 0usize;
    let mut variable = false;
    let mut distinct: Vec<Option<String>> = Vec::new();
    for value in column_values(df.column(column)?)?.into_iter().flatten() {
        if value.trim().is_empty() {
            continue;
        }
        match parse_interval(&value) {
            Some(ComputationInterval::Fixed(meters)) => {
                distinct.push(Some(format_numeric(meters)));
            }
            Some(_) => variable = true,
            None => ignored += 1,
        }
    }
    if ignored > 0 {
        warn!(column = %column, ignored, "non-numeric interval values ignored");
    }
    if variable {
        return Ok(ComputationInterval::Variable);
    }
    Ok(match unique_value(distinct) {
        UniqueValue::Absent => ComputationInterval::Unknown,
        UniqueValue::Unique(text) => parse_f64(&text)
            .map(ComputationInterval::Fixed)
            .unwrap_or(ComputationInterval::Unknown),
        UniqueValue::Conflicting(_) => ComputationInterval::Variable,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::{IntoColumn, NamedFrom, Series};

    fn frame(name: &str, values: &[Option<&str>]) -> DataFrame {
        let values: Vec<Option<String>> = values.iter().map(|v| v.map(String::from)).collect();
        DataFrame::new(vec![Series::new(name.into(), values).into_column()]).unwrap()
    }

    #[test]
    fn test_unique_value() {
        assert_eq!(unique_value(Vec::<Option<&str>>::new()), UniqueValue::Absent);
        assert_eq!(
            unique_value([Some("ZH"), None, Some(" ZH "), Some("")]),
            UniqueValue::Unique("ZH".to_string())
        );
        assert_eq!(
            unique_value([Some("ZH"), Some("BE"), Some("ZH")]),
            UniqueValue::Conflicting(vec!["BE".to_string(), "ZH".to_string()])
        );
    }

    #[test]
    fn test_region_column_overrides_token() {
        let df = frame("Kanton", &[Some("BL"), Some("BL")]);
        assert_eq!(resolve_region(&df, "Kanton", "BS").unwrap(), "BL");

        let df = frame("kanton", &[None, None]);
        assert_eq!(resolve_region(&df, "Kanton", "BS").unwrap(), "BS");

        let df = frame("Objekt", &[Some("x")]);
        assert_eq!(resolve_region(&df, "Kanton", "BS").unwrap(), "BS");
    }

    #[test]
    fn test_ambiguous_region() {
        let df = frame("Kanton", &[Some("BL"), Some("BS")]);
        let err = resolve_region(&df, "Kanton", "BS").unwrap_err();
        assert!(matches!(err, CoreError::AmbiguousRegion { .. }));
    }

    #[test]
    fn test_resolve_interval() {
        let df = frame("Intervall", &[Some("10"), Some("10.0"), None]);
        assert_eq!(
            resolve_interval(&df, Some("Intervall")).unwrap(),
            ComputationInterval::Fixed(10.0)
        );

        let df = frame("Intervall", &[Some("10"), Some("20")]);
        assert_eq!(
            resolve_interval(&df, Some("Intervall")).unwrap(),
            ComputationInterval::Variable
        );

        let df = frame("Intervall", &[Some("Variabel"), Some("10")]);
        assert_eq!(
            resolve_interval(&df, Some("Intervall")).unwrap(),
            ComputationInterval::Variable
        );

        let df = frame("Intervall", &[None, Some("k.A.")]);
        assert_eq!(
            resolve_interval(&df, Some("Intervall")).unwrap(),
            ComputationInterval::Unknown
        );
        assert_eq!(
            resolve_interval(&df, None).unwrap(),
            ComputationInterval::Unknown
        );
    }
}
