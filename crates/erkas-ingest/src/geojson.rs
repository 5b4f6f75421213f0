//! GeoJSON FeatureCollection store.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use serde_json::{Map, Value, json};

use crate::error::{IngestError, Result};
use crate::frame::{Crs, GeoFeature, GeoFrame};

fn format_error(path: &Path, reason: impl Into<String>) -> IngestError {
    IngestError::GeoJsonFormat {
        path: path.to_path_buf(),
        reason: reason.into(),
    }
}

/// Reads the legacy `crs` member (`{"type": "name", "properties": {"name": ...}}`).
fn read_crs(collection: &Map<String, Value>) -> Option<Crs> {
    collection
        .get("crs")?
        .get("properties")?
        .get("name")?
        .as_str()
        .map(Crs::parse)
}

/// Reads a FeatureCollection into a [`GeoFrame`].
///
/// Columns are ordered by first appearance across features. A collection
/// without a `crs` member is assigned `default_crs`.
pub fn read_geojson(path: &Path, default_crs: &Crs) -> Result<GeoFrame> {
    let file = File::open(path).map_err(|source| IngestError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    let root: Value =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| IngestError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;

    let Value::Object(collection) = root else {
        return Err(format_error(path, "top-level value is not an object"));
    };
    match collection.get("type").and_then(Value::as_str) {
        Some("FeatureCollection") => {}
        other => {
            return Err(format_error(
                path,
                format!("expected FeatureCollection, found {other:?}"),
            ));
        }
    }
    let crs = read_crs(&collection).unwrap_or_else(|| default_crs.clone());
    let features = match collection.get("features") {
        Some(Value::Array(features)) => features,
        _ => return Err(format_error(path, "missing features array")),
    };

    let mut frame = GeoFrame::new(crs, Vec::new());
    for (idx, feature) in features.iter().enumerate() {
        let properties = match feature.get("properties") {
            Some(Value::Object(properties)) => properties.clone(),
            None | Some(Value::Null) => Map::new(),
            Some(_) => {
                return Err(format_error(
                    path,
                    format!("feature {idx} has non-object properties"),
                ));
            }
        };
        for key in properties.keys() {
            if !frame.columns.contains(key) {
                frame.columns.push(key.clone());
            }
        }
        let geometry = match feature.get("geometry") {
            None | Some(Value::Null) => None,
            Some(geometry) => Some(geometry.clone()),
        };
        frame.push(GeoFeature {
            properties,
            geometry,
        });
    }
    Ok(frame)
}

/// Converts a frame to a FeatureCollection value. Properties follow the
/// frame's column order; absent attributes are written as `null`.
pub fn to_feature_collection(frame: &GeoFrame) -> Value {
    let features: Vec<Value> = frame
        .features
        .iter()
        .map(|feature| {
            let mut properties = Map::new();
            for column in &frame.columns {
                let value = feature
                    .properties
                    .get(column)
                    .cloned()
                    .unwrap_or(Value::Null);
                properties.insert(column.clone(), value);
            }
            json!({
                "type": "Feature",
                "properties": properties,
                "geometry": feature.geometry.clone().unwrap_or(Value::Null),
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "crs": {
            "type": "name",
            "properties": { "name": frame.crs.to_urn() },
        },
        "features": features,
    })
}

/// Writes a frame as a FeatureCollection.
pub fn write_geojson(path: &Path, frame: &GeoFrame) -> Result<()> {
    let write_error = |source: std::io::Error| IngestError::FileWrite {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(write_error)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, &to_feature_collection(frame)).map_err(|source| {
        IngestError::FileWrite {
            path: path.to_path_buf(),
            source: source.into(),
        }
    })?;
    writer.write_all(b"\n").map_err(write_error)?;
    writer.flush().map_err(write_error)?;
    Ok(())
}
