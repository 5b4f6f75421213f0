//! In-memory geospatial dataset.
//!
//! A [`GeoFrame`] is what the stores hand to the pipeline: an ordered list of
//! attribute columns, one feature per road segment, and the coordinate
//! reference system all geometries share. Attributes stay as JSON values so a
//! dataset can be written back without losing the distinction between numbers
//! and text.

use std::fmt;

use polars::prelude::{Column, DataFrame, IntoColumn, NamedFrom, Series};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::values::json_to_string;

/// Coordinate reference system identifier, normalized to `AUTHORITY:CODE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Crs(String);

impl Crs {
    /// Parses `EPSG:2056`, `urn:ogc:def:crs:EPSG::2056`, or any other
    /// identifier, which is kept verbatim.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Some(rest) = trimmed.strip_prefix("urn:ogc:def:crs:") {
            let parts: Vec<&str> = rest.split(':').filter(|p| !p.is_empty()).collect();
            if let (Some(authority), Some(code)) = (parts.first(), parts.last()) {
                if parts.len() >= 2 {
                    return Self(format!("{}:{}", authority.to_ascii_uppercase(), code));
                }
            }
        }
        Self(trimmed.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The OGC URN form written into GeoJSON `crs` members.
    pub fn to_urn(&self) -> String {
        match self.0.split_once(':') {
            Some((authority, code)) => format!("urn:ogc:def:crs:{authority}::{code}"),
            None => self.0.clone(),
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One record with its attributes and optional geometry.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoFeature {
    pub properties: Map<String, Value>,
    pub geometry: Option<Value>,
}

impl GeoFeature {
    /// Builds a point geometry.
    pub fn point(easting: f64, northing: f64) -> Value {
        serde_json::json!({
            "type": "Point",
            "coordinates": [easting, northing],
        })
    }
}

/// A set of features sharing one attribute schema and reference system.
#[derive(Debug, Clone, PartialEq)]
pub struct GeoFrame {
    pub crs: Crs,
    /// Attribute columns in schema order.
    pub columns: Vec<String>,
    pub features: Vec<GeoFeature>,
}

impl GeoFrame {
    pub fn new(crs: Crs, columns: Vec<String>) -> Self {
        Self {
            crs,
            columns,
            features: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn push(&mut self, feature: GeoFeature) {
        self.features.push(feature);
    }

    /// Attribute table as a DataFrame of string columns.
    ///
    /// Numbers are rendered with their JSON text, `null` and blank strings
    /// become nulls. Geometry is not included.
    pub fn to_data_frame(&self) -> Result<DataFrame> {
        let columns: Vec<Column> = self
            .columns
            .iter()
            .map(|name| {
                let values: Vec<Option<String>> = self
                    .features
                    .iter()
                    .map(|feature| feature.properties.get(name).and_then(json_to_string))
                    .collect();
                Series::new(name.as_str().into(), values).into_column()
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_crs_parse() {
        assert_eq!(Crs::parse("EPSG:2056").as_str(), "EPSG:2056");
        assert_eq!(Crs::parse("urn:ogc:def:crs:EPSG::2056").as_str(), "EPSG:2056");
        assert_eq!(Crs::parse("urn:ogc:def:crs:epsg:9.8:2056").as_str(), "EPSG:2056");
        assert_eq!(Crs::parse("LV95").as_str(), "LV95");
    }

    #[test]
    fn test_crs_urn() {
        assert_eq!(
            Crs::parse("EPSG:2056").to_urn(),
            "urn:ogc:def:crs:EPSG::2056"
        );
    }

    #[test]
    fn test_to_data_frame() {
        let mut frame = GeoFrame::new(
            Crs::parse("EPSG:2056"),
            vec!["IDLaenge".to_string(), "KBfrei".to_string()],
        );
        let mut properties = Map::new();
        properties.insert("IDLaenge".to_string(), json!(1000));
        properties.insert("KBfrei".to_string(), json!(true));
        frame.push(GeoFeature {
            properties,
            geometry: None,
        });
        let mut properties = Map::new();
        properties.insert("IDLaenge".to_string(), json!(12.5));
        properties.insert("KBfrei".to_string(), Value::Null);
        frame.push(GeoFeature {
            properties,
            geometry: None,
        });

        let df = frame.to_data_frame().unwrap();
        assert_eq!(df.height(), 2);
        let lengths: Vec<Option<&str>> = df.column("IDLaenge").unwrap().str().unwrap().iter().collect();
        assert_eq!(lengths, vec![Some("1000"), Some("12.5")]);
        let flags: Vec<Option<&str>> = df.column("KBfrei").unwrap().str().unwrap().iter().collect();
        assert_eq!(flags, vec![Some("true"), None]);
    }
}
