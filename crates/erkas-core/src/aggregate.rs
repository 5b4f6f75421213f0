//! Length sums per category.
//!
//! Segments with a null length contribute nothing. Segments with a null
//! category are left out of the groups but still count toward
//! [`total_length`].

use std::collections::BTreeMap;

use polars::prelude::*;

use crate::error::Result;

fn grouped_sums(df: &DataFrame, category: &str, length: &str) -> Result<DataFrame> {
    let grouped = df
        .clone()
        .lazy()
        .filter(col(category).is_not_null().and(col(length).is_not_null()))
        .group_by([col(category)])
        .agg([col(length).sum()])
        .collect()?;
    Ok(grouped)
}

/// Sums `length` per value of a text column.
pub fn sum_by_category(
    df: &DataFrame,
    category: &str,
    length: &str,
) -> Result<BTreeMap<String, f64>> {
    let grouped = grouped_sums(df, category, length)?;
    let keys = grouped.column(category)?.str()?;
    let sums = grouped.column(length)?.f64()?;
    let mut totals = BTreeMap::new();
    for (key, sum) in keys.iter().zip(sums.iter()) {
        if let (Some(key), Some(sum)) = (key, sum) {
            totals.insert(key.to_string(), sum);
        }
    }
    Ok(totals)
}

/// Sums `length` per value of an integer code column.
pub fn sum_by_code(df: &DataFrame, category: &str, length: &str) -> Result<BTreeMap<i64, f64>> {
    let grouped = grouped_sums(df, category, length)?;
    let keys = grouped.column(category)?.i64()?;
    let sums = grouped.column(length)?.f64()?;
    let mut totals = BTreeMap::new();
    for (key, sum) in keys.iter().zip(sums.iter()) {
        if let (Some(key), Some(sum)) = (key, sum) {
            totals.insert(key, sum);
        }
    }
    Ok(totals)
}

/// Sum of all non-null lengths; 0 for an empty frame.
pub fn total_length(df: &DataFrame, length: &str) -> Result<f64> {
    Ok(df.column(length)?.f64()?.sum().unwrap_or(0.0))
}
