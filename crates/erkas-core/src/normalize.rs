//! Value normalization for the analysis frame.
//!
//! Source frames hold every attribute as text. This module produces the
//! typed segment frame the aggregator works on: `IDLaenge` as Float64,
//! `KBfrei` as a canonical token, and the three code columns as Int64.

use erkas_ingest::parse_f64;
use erkas_model::{ClassificationFamily, ExemptionTokens, Role};
use polars::prelude::{Column, DataFrame, DataType, IntoColumn, NamedFrom, Series};

use crate::error::{CoreError, Result};
use crate::schema::ResolvedSchema;

/// Canonical token of an exempted segment.
pub const EXEMPT: &str = "1";
/// Canonical token of a segment subject to assessment.
pub const NOT_EXEMPT: &str = "0";

fn matches_token(candidates: &[String], trimmed: &str, numeric: Option<f64>) -> bool {
    candidates.iter().any(|token| {
        token == trimmed
            || numeric.is_some_and(|value| parse_f64(token).is_some_and(|token| token == value))
    })
}

/// Maps a raw exemption value onto its canonical token.
///
/// Numeric values match numeric tokens by value, so `1.0` is exempt under the
/// default `1`. Unknown tokens pass through unchanged so they form their own
/// group.
pub fn normalize_exemption_token(raw: &str, tokens: &ExemptionTokens) -> String {
    let trimmed = raw.trim();
    let numeric = parse_f64(trimmed);
    if matches_token(&tokens.exempt, trimmed, numeric) {
        EXEMPT.to_string()
    } else if matches_token(&tokens.not_exempt, trimmed, numeric) {
        NOT_EXEMPT.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Parses a classification code. Integral floats such as `2.0` are accepted.
pub fn parse_code(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let value = parse_f64(trimmed)?;
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(value as i64)
    } else {
        None
    }
}

fn string_values(column: &Column) -> Result<Vec<Option<String>>> {
    let column = column.cast(&DataType::String)?;
    let values = column
        .str()?
        .iter()
        .map(|value| {
            value
                .map(str::trim)
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        })
        .collect();
    Ok(values)
}

fn coerce<T>(
    column: &Column,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Vec<Option<T>>> {
    string_values(column)?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            None => Ok(None),
            Some(value) => parse(&value).map(Some).ok_or_else(|| CoreError::NumericCoercion {
                column: column.name().to_string(),
                value,
                row,
            }),
        })
        .collect()
}

/// Parses segment lengths in meters.
pub fn parse_lengths(column: &Column, name: &str) -> Result<Series> {
    let values = coerce(column, parse_f64)?;
    Ok(Series::new(name.into(), values))
}

/// Casts classification codes to whole numbers.
pub fn cast_codes(column: &Column, name: &str) -> Result<Series> {
    let values = coerce(column, parse_code)?;
    Ok(Series::new(name.into(), values))
}

/// Canonicalizes exemption values. Missing values stay null.
pub fn normalize_exemption(column: &Column, name: &str, tokens: &ExemptionTokens) -> Result<Series> {
    let values: Vec<Option<String>> = string_values(column)?
        .into_iter()
        .map(|value| value.map(|raw| normalize_exemption_token(&raw, tokens)))
        .collect();
    Ok(Series::new(name.into(), values))
}

/// Builds the typed segment frame from a source frame.
///
/// Output columns are named by [`Role::canonical_name`]. All required roles
/// must already be resolved.
pub fn build_segments(
    df: &DataFrame,
    schema: &ResolvedSchema,
    tokens: &ExemptionTokens,
) -> Result<DataFrame> {
    let mut columns: Vec<Column> = Vec::with_capacity(2 + ClassificationFamily::ALL.len());

    let length = df.column(schema.require(Role::Length)?)?;
    columns.push(parse_lengths(length, Role::Length.canonical_name())?.into_column());

    let exemption = df.column(schema.require(Role::Exemption)?)?;
    columns.push(
        normalize_exemption(exemption, Role::Exemption.canonical_name(), tokens)?.into_column(),
    );

    for family in ClassificationFamily::ALL {
        let role = family.role();
        let codes = df.column(schema.require(role)?)?;
        columns.push(cast_codes(codes, role.canonical_name())?.into_column());
    }

    Ok(DataFrame::new(columns)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::resolve_schema;
    use erkas_model::RoleFragments;

    fn text_column(name: &str, values: &[Option<&str>]) -> Column {
        let values: Vec<Option<String>> = values.iter().map(|v| v.map(String::from)).collect();
        Series::new(name.into(), values).into_column()
    }

    #[test]
    fn test_exemption_tokens() {
        let tokens = ExemptionTokens::default();
        for raw in ["true", "TRUE", "1", " true "] {
            assert_eq!(normalize_exemption_token(raw, &tokens), EXEMPT, "{raw}");
        }
        for raw in ["false", "FALSE", "N", "0"] {
            assert_eq!(normalize_exemption_token(raw, &tokens), NOT_EXEMPT, "{raw}");
        }
        assert_eq!(normalize_exemption_token("True", &tokens), "True");
        assert_eq!(normalize_exemption_token("J", &tokens), "J");
    }

    #[test]
    fn test_numeric_exemption_values_match_by_value() {
        let tokens = ExemptionTokens::default();
        for raw in ["1.0", "1.00", " 1.0 "] {
            assert_eq!(normalize_exemption_token(raw, &tokens), EXEMPT, "{raw}");
        }
        for raw in ["0.0", "-0.0"] {
            assert_eq!(normalize_exemption_token(raw, &tokens), NOT_EXEMPT, "{raw}");
        }
        assert_eq!(normalize_exemption_token("2.0", &tokens), "2.0");
        assert_eq!(normalize_exemption_token("0.5", &tokens), "0.5");
    }

    #[test]
    fn test_parse_code() {
        assert_eq!(parse_code("2"), Some(2));
        assert_eq!(parse_code("2.0"), Some(2));
        assert_eq!(parse_code(" 5 "), Some(5));
        assert_eq!(parse_code("2.5"), None);
        assert_eq!(parse_code("rot"), None);
    }

    #[test]
    fn test_parse_lengths_keeps_nulls() {
        let column = text_column("Resultat_IDLaenge", &[Some("1000"), None, Some(" 12.5 ")]);
        let series = parse_lengths(&column, "IDLaenge").unwrap();
        let values: Vec<Option<f64>> = series.f64().unwrap().iter().collect();
        assert_eq!(values, vec![Some(1000.0), None, Some(12.5)]);
        assert_eq!(series.name().as_str(), "IDLaenge");
    }

    #[test]
    fn test_unparsable_length_is_coercion_error() {
        let column = text_column("IDLaenge", &[Some("1000"), Some("lang")]);
        let err = parse_lengths(&column, "IDLaenge").unwrap_err();
        match err {
            CoreError::NumericCoercion { column, value, row } => {
                assert_eq!(column, "IDLaenge");
                assert_eq!(value, "lang");
                assert_eq!(row, 1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_build_segments() {
        let df = DataFrame::new(vec![
            text_column("Resultat_IDLaenge", &[Some("1000"), Some("2000")]),
            text_column("KBfrei", &[Some("TRUE"), Some("N")]),
            text_column("AmpelCodePers", &[Some("1.0"), None]),
            text_column("AmpelCodeOFG", &[Some("0"), Some("3")]),
            text_column("AmpelCodeGW", &[None, None]),
        ])
        .unwrap();
        let columns: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        let schema = resolve_schema(&columns, &RoleFragments::default());

        let segments = build_segments(&df, &schema, &ExemptionTokens::default()).unwrap();
        let names: Vec<String> = segments
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        assert_eq!(
            names,
            ["IDLaenge", "KBfrei", "AmpelCodePers", "AmpelCodeOFG", "AmpelCodeGW"]
        );
        let flags: Vec<Option<&str>> = segments.column("KBfrei").unwrap().str().unwrap().iter().collect();
        assert_eq!(flags, vec![Some("1"), Some("0")]);
        let pers: Vec<Option<i64>> = segments
            .column("AmpelCodePers")
            .unwrap()
            .i64()
            .unwrap()
            .iter()
            .collect();
        assert_eq!(pers, vec![Some(1), None]);
        assert_eq!(segments.column("AmpelCodeGW").unwrap().null_count(), 2);
    }
}
