//! Processing of one region dataset.
//!
//! [`analyze_region`] is the pure part: schema resolution, normalization,
//! aggregation and row composition over an already loaded frame.
//! [`RegionProcessor`] wraps it with loading, cancellation checks and the
//! subset artifact write.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Instant;

use erkas_ingest::{GeoFeature, GeoFrame, GeoStore, RegionFile, f64_to_json, json_to_string};
use erkas_model::columns::{FORMAT, INTERVAL, REGION};
use erkas_model::{
    ClassificationFamily, ComputationInterval, OutputLayout, PipelineConfig, RegionSummary, Role,
    SchemaGeneration,
};
use polars::prelude::DataFrame;
use serde_json::{Map, Value};
use tracing::{debug, info, info_span};

use crate::aggregate::{sum_by_category, sum_by_code, total_length};
use crate::attributes::{parse_interval, resolve_interval, resolve_region};
use crate::cancel::CancellationToken;
use crate::compose::{RegionAggregates, check_generation, compose_summary};
use crate::error::{CoreError, Result};
use crate::normalize::{EXEMPT, NOT_EXEMPT, build_segments};
use crate::schema::resolve_schema;

/// Summary row and subset dataset of one analyzable region.
#[derive(Debug, Clone)]
pub struct RegionAnalysis {
    pub summary: RegionSummary,
    pub generation: SchemaGeneration,
    /// Canonical columns plus geometry, one feature per source segment.
    pub subset: GeoFrame,
}

/// Columns of every per-region subset, in write order.
pub fn subset_columns() -> Vec<String> {
    let mut columns = vec![REGION.to_string(), FORMAT.to_string(), INTERVAL.to_string()];
    columns.extend(
        Role::REQUIRED
            .iter()
            .map(|role| role.canonical_name().to_string()),
    );
    columns
}

/// Analyzes a loaded region frame.
pub fn analyze_region(
    file: &RegionFile,
    frame: &GeoFrame,
    config: &PipelineConfig,
) -> Result<RegionAnalysis> {
    let schema = resolve_schema(&frame.columns, &config.roles);
    schema.require_all()?;
    let generation = check_generation(
        file.kind,
        schema.subset_columns().len(),
        config.generations.for_kind(file.kind),
    )?;

    let source = frame.to_data_frame()?;
    let region = resolve_region(&source, &config.region_column, &file.region_token)?;
    let interval_column = schema.primary(Role::Interval);
    let interval = resolve_interval(&source, interval_column)?;

    let segments = build_segments(&source, &schema, &config.exemption)?;
    let length = Role::Length.canonical_name();
    let exemption = sum_by_category(&segments, Role::Exemption.canonical_name(), length)?;
    let mut aggregates = RegionAggregates {
        total_m: total_length(&segments, length)?,
        exempted_m: exemption.get(EXEMPT).copied().unwrap_or(0.0),
        codes: BTreeMap::new(),
    };
    for family in ClassificationFamily::ALL {
        let codes = sum_by_code(&segments, family.role().canonical_name(), length)?;
        aggregates.codes.insert(family, codes);
    }
    debug!(
        region = %region,
        generation = ?generation,
        segments = segments.height(),
        exemption_groups = ?exemption.keys().collect::<Vec<_>>(),
        "region aggregated"
    );

    let summary = compose_summary(&region, file.kind, interval, &aggregates);
    let subset = build_subset(frame, &segments, &summary, interval_column)?;
    Ok(RegionAnalysis {
        summary,
        generation,
        subset,
    })
}

fn exemption_to_json(value: Option<&str>) -> Value {
    match value {
        Some(EXEMPT) => Value::from(1),
        Some(NOT_EXEMPT) => Value::from(0),
        Some(other) => Value::String(other.to_string()),
        None => Value::Null,
    }
}

fn interval_to_json(interval: ComputationInterval) -> Value {
    match interval {
        ComputationInterval::Fixed(meters) => f64_to_json(meters),
        ComputationInterval::Variable => Value::String(interval.to_string()),
        ComputationInterval::Unknown => Value::Null,
    }
}

/// Projects the source features onto the subset columns.
///
/// The interval is the segment's own value when it has one, the region
/// interval otherwise.
fn build_subset(
    frame: &GeoFrame,
    segments: &DataFrame,
    summary: &RegionSummary,
    interval_column: Option<&str>,
) -> Result<GeoFrame> {
    let lengths = segments.column(Role::Length.canonical_name())?.f64()?;
    let exemptions = segments.column(Role::Exemption.canonical_name())?.str()?;
    let codes = ClassificationFamily::ALL
        .iter()
        .map(|family| segments.column(family.role().canonical_name())?.i64())
        .collect::<std::result::Result<Vec<_>, _>>()?;

    let region = Value::String(summary.region.clone());
    let format = Value::String(summary.source_kind.format_tag().to_string());
    let region_interval = interval_to_json(summary.interval);

    let mut subset = GeoFrame::new(frame.crs.clone(), subset_columns());
    for (idx, feature) in frame.features.iter().enumerate() {
        let own_interval = interval_column
            .and_then(|column| feature.properties.get(column))
            .and_then(json_to_string)
            .and_then(|raw| parse_interval(&raw))
            .map(interval_to_json);

        let mut properties = Map::new();
        properties.insert(REGION.to_string(), region.clone());
        properties.insert(FORMAT.to_string(), format.clone());
        properties.insert(
            INTERVAL.to_string(),
            own_interval.unwrap_or_else(|| region_interval.clone()),
        );
        properties.insert(
            Role::Length.canonical_name().to_string(),
            lengths.get(idx).map(f64_to_json).unwrap_or(Value::Null),
        );
        properties.insert(
            Role::Exemption.canonical_name().to_string(),
            exemption_to_json(exemptions.get(idx)),
        );
        for (family, values) in ClassificationFamily::ALL.iter().zip(&codes) {
            properties.insert(
                family.role().canonical_name().to_string(),
                values.get(idx).map(Value::from).unwrap_or(Value::Null),
            );
        }
        subset.push(GeoFeature {
            properties,
            geometry: feature.geometry.clone(),
        });
    }
    Ok(subset)
}

/// Outcome of a processed region.
#[derive(Debug, Clone)]
pub struct ProcessedRegion {
    pub file: RegionFile,
    pub summary: RegionSummary,
    pub segments: usize,
    pub subset_path: PathBuf,
}

/// Runs one region file end to end.
pub struct RegionProcessor<'a> {
    config: &'a PipelineConfig,
    store: &'a dyn GeoStore,
    layout: &'a OutputLayout,
    cancel: &'a CancellationToken,
}

impl<'a> RegionProcessor<'a> {
    pub fn new(
        config: &'a PipelineConfig,
        store: &'a dyn GeoStore,
        layout: &'a OutputLayout,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            config,
            store,
            layout,
            cancel,
        }
    }

    /// Loads, analyzes and writes the subset of one region file.
    ///
    /// Cancellation is checked before each stage. Once the subset write has
    /// started it runs to completion.
    pub fn process(&self, file: &RegionFile) -> Result<ProcessedRegion> {
        let source_file = file.path.display().to_string();
        let span = info_span!(
            "region",
            region = %file.region_token,
            kind = %file.kind,
            source_file = %source_file
        );
        let _guard = span.enter();
        let start = Instant::now();

        self.cancel.check()?;
        let frame = self.store.load_region(file)?;

        self.cancel.check()?;
        let analysis = analyze_region(file, &frame, self.config)?;

        self.cancel.check()?;
        let subset_path = self.layout.region_subset(file.kind, &file.stem);
        self.store
            .write_dataset(&subset_path, &analysis.subset)
            .map_err(CoreError::Output)?;

        info!(
            region = %analysis.summary.region,
            segments = frame.len(),
            total_km = analysis.summary.total_km,
            duration_ms = start.elapsed().as_millis(),
            "region processed"
        );
        Ok(ProcessedRegion {
            file: file.clone(),
            segments: frame.len(),
            summary: analysis.summary,
            subset_path,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use erkas_ingest::Crs;
    use erkas_model::SourceKind;
    use serde_json::json;
    use std::path::PathBuf;

    fn feature(values: Value) -> GeoFeature {
        let Value::Object(properties) = values else {
            panic!("expected object");
        };
        GeoFeature {
            properties,
            geometry: Some(GeoFeature::point(2600000.0, 1200000.0)),
        }
    }

    fn geo_frame(columns: &[&str], features: Vec<Value>) -> GeoFrame {
        let mut frame = GeoFrame::new(
            Crs::parse("EPSG:2056"),
            columns.iter().map(|c| c.to_string()).collect(),
        );
        for values in features {
            frame.push(feature(values));
        }
        frame
    }

    const CURRENT: [&str; 6] = [
        "Resultat_IDLaenge",
        "Resultat_KBfrei",
        "Resultat_AmpelCodePers",
        "Resultat_AmpelCodeOFG",
        "Resultat_AmpelCodeGW",
        "Berechnungsintervall",
    ];

    #[test]
    fn test_subset_carries_canonical_columns() {
        let frame = geo_frame(
            &CURRENT,
            vec![
                json!({"Resultat_IDLaenge": 1000, "Resultat_KBfrei": "true",
                       "Resultat_AmpelCodePers": 2, "Resultat_AmpelCodeOFG": null,
                       "Resultat_AmpelCodeGW": "1", "Berechnungsintervall": 10}),
                json!({"Resultat_IDLaenge": "250.5", "Resultat_KBfrei": "N",
                       "Resultat_AmpelCodePers": 0, "Resultat_AmpelCodeOFG": 4,
                       "Resultat_AmpelCodeGW": null, "Berechnungsintervall": null}),
            ],
        );
        let file = RegionFile::new(PathBuf::from("xtf/ERKAS_2023_SG.geojson"), SourceKind::Geo);
        let analysis = analyze_region(&file, &frame, &PipelineConfig::default()).unwrap();

        assert_eq!(analysis.generation, SchemaGeneration::Current);
        assert_eq!(analysis.summary.region, "SG");
        assert_eq!(analysis.summary.interval, ComputationInterval::Fixed(10.0));
        assert_eq!(analysis.subset.columns, subset_columns());
        assert_eq!(analysis.subset.len(), 2);

        let first = &analysis.subset.features[0].properties;
        assert_eq!(first["Kanton"], json!("SG"));
        assert_eq!(first["Format"], json!("XTF"));
        assert_eq!(first["Berechnungsintervall [m]"], json!(10.0));
        assert_eq!(first["IDLaenge"], json!(1000.0));
        assert_eq!(first["KBfrei"], json!(1));
        assert_eq!(first["AmpelCodePers"], json!(2));
        assert_eq!(first["AmpelCodeOFG"], Value::Null);
        assert!(analysis.subset.features[0].geometry.is_some());

        let second = &analysis.subset.features[1].properties;
        assert_eq!(second["KBfrei"], json!(0));
        assert_eq!(second["Berechnungsintervall [m]"], json!(10.0));
    }

    #[test]
    fn test_missing_role_rejects_region() {
        let frame = geo_frame(&["IDLaenge", "KBfrei"], Vec::new());
        let file = RegionFile::new(PathBuf::from("ERKAS_2021_NW.geojson"), SourceKind::Geo);
        let err = analyze_region(&file, &frame, &PipelineConfig::default()).unwrap_err();
        assert!(matches!(err, CoreError::MissingRole { .. }));
    }
}
