//! Integration tests for the national combine and merge.

use std::fs;

use erkas_ingest::{Crs, FileStore, GeoFeature, GeoFrame, GeoStore};
use erkas_model::{
    ComputationInterval, FamilySummary, OutputLayout, PipelineConfig, RegionSummary, SourceKind,
};
use erkas_report::{
    ReportError, SummaryTable, combine_kind_tables, merge_artifacts, prepare_layout,
};
use serde_json::{Map, json};

fn family(codes: [Option<f64>; 6], assessed_km: f64, not_yet_assessed_km: f64) -> FamilySummary {
    FamilySummary {
        codes,
        assessed_km,
        not_yet_assessed_km,
    }
}

fn zh() -> RegionSummary {
    RegionSummary {
        region: "ZH".to_string(),
        source_kind: SourceKind::Spreadsheet,
        interval: ComputationInterval::Unknown,
        total_km: 6.0,
        exempted_km: 1.0,
        pers: family([None, None, Some(2.0), Some(3.0), None, None], 5.0, 0.0),
        ofg: family([Some(2.0), Some(3.0), None, None, None, None], 3.0, 2.0),
        gw: family([None, None, None, None, None, Some(3.0)], 0.0, 5.0),
    }
}

fn sg() -> RegionSummary {
    RegionSummary {
        region: "SG".to_string(),
        source_kind: SourceKind::Geo,
        interval: ComputationInterval::Variable,
        total_km: 2.5,
        exempted_km: 0.5,
        pers: family([Some(0.5), Some(1.5), None, None, None, None], 1.5, 0.5),
        ofg: family([None; 6], 0.0, 2.0),
        gw: family([None, None, None, None, Some(2.0), None], 2.0, 0.0),
    }
}

#[test]
fn national_table_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    prepare_layout(&layout).unwrap();

    // Written in reverse kind order; the combine still follows kind order.
    SummaryTable::from_summaries([&sg()])
        .write_csv(&layout.kind_table(SourceKind::Geo))
        .unwrap();
    SummaryTable::from_summaries([&zh()])
        .write_csv(&layout.kind_table(SourceKind::Spreadsheet))
        .unwrap();

    let national = combine_kind_tables(&layout).unwrap();
    assert_eq!(national.len(), 2);
    national.write_csv(&layout.national_table()).unwrap();

    let text = fs::read_to_string(layout.national_table()).unwrap();
    insta::assert_snapshot!(text.trim_end(), @r"
    Kanton,Format,Berechnungsintervall [m],Durchgangsstrasse [km],KB-befreit [km],Zu beurteilen AmpelcodePers [km],Beurteilt AmpelcodePers [km],AmpelcodePers0,AmpelcodePers1,AmpelcodePers2,AmpelcodePers3,AmpelcodePers4,AmpelcodePers5,Zu beurteilen AmpelcodeOFG [km],Beurteilt AmpelcodeOFG [km],AmpelcodeOFG0,AmpelcodeOFG1,AmpelcodeOFG2,AmpelcodeOFG3,AmpelcodeOFG4,AmpelcodeOFG5,Zu beurteilen AmpelcodeGW [km],Beurteilt AmpelcodeGW [km],AmpelcodeGW0,AmpelcodeGW1,AmpelcodeGW2,AmpelcodeGW3,AmpelcodeGW4,AmpelcodeGW5
    ZH,CSV,,6,1,0,5,,,2,3,,,2,3,2,3,,,,,5,0,,,,,,3
    SG,XTF,variabel,2.5,0.5,0.5,1.5,0.5,1.5,,,,,2,0,,,,,,,0,2,,,,,2,
    ");
}

#[test]
fn missing_kind_table_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    prepare_layout(&layout).unwrap();
    SummaryTable::from_summaries([&sg()])
        .write_csv(&layout.kind_table(SourceKind::Geo))
        .unwrap();

    let national = combine_kind_tables(&layout).unwrap();
    assert_eq!(national.len(), 1);
    assert_eq!(national.cell(0, "Kanton"), Some("SG"));
    assert_eq!(national.cell(0, "Berechnungsintervall [m]"), Some("variabel"));
}

#[test]
fn merges_written_subsets() {
    let dir = tempfile::tempdir().unwrap();
    let layout = OutputLayout::new(dir.path());
    prepare_layout(&layout).unwrap();
    let store = FileStore::from_config(&PipelineConfig::default());

    let mut paths = Vec::new();
    for (kind, stem, region) in [
        (SourceKind::Spreadsheet, "ERKAS_2021_ZH", "ZH"),
        (SourceKind::Geo, "ERKAS_2021_SG", "SG"),
    ] {
        let mut frame = GeoFrame::new(
            Crs::parse("EPSG:2056"),
            vec!["Kanton".to_string(), "IDLaenge".to_string()],
        );
        let mut properties = Map::new();
        properties.insert("Kanton".to_string(), json!(region));
        properties.insert("IDLaenge".to_string(), json!(1000.0));
        frame.push(GeoFeature {
            properties,
            geometry: Some(GeoFeature::point(2600000.0, 1200000.0)),
        });
        let path = layout.region_subset(kind, stem);
        store.write_dataset(&path, &frame).unwrap();
        paths.push(path);
    }

    let merged = merge_artifacts(&store, &paths).unwrap();
    assert_eq!(merged.len(), 2);
    assert_eq!(merged.crs.as_str(), "EPSG:2056");
    assert_eq!(merged.features[1].properties["Kanton"], json!("SG"));

    let err = merge_artifacts(&store, &[]).unwrap_err();
    assert!(matches!(err, ReportError::EmptyMergeSet));
}
