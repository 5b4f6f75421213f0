//! Summary row composition.
//!
//! A row is only composed for datasets whose resolved subset has the column
//! count of a known schema generation. Aggregates arrive in meters and are
//! converted to kilometers here.

use std::collections::BTreeMap;

use erkas_model::columns::CODE_COUNT;
use erkas_model::{
    ClassificationFamily, ComputationInterval, FamilySummary, GenerationSignature,
    RegionSummary, SchemaGeneration, SourceKind,
};

use crate::error::{CoreError, Result};
use crate::reconcile::reconcile;

const METERS_PER_KM: f64 = 1000.0;

/// Checks the resolved-subset column count against the known generations.
pub fn check_generation(
    kind: SourceKind,
    column_count: usize,
    signature: GenerationSignature,
) -> Result<SchemaGeneration> {
    signature
        .generation(column_count)
        .ok_or(CoreError::SchemaMismatch {
            kind,
            found: column_count,
            legacy: signature.legacy,
            current: signature.current,
        })
}

/// Per-region aggregates in meters.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RegionAggregates {
    pub total_m: f64,
    pub exempted_m: f64,
    pub codes: BTreeMap<ClassificationFamily, BTreeMap<i64, f64>>,
}

fn compose_family(aggregates: &RegionAggregates, family: ClassificationFamily) -> FamilySummary {
    let empty = BTreeMap::new();
    let codes = aggregates.codes.get(&family).unwrap_or(&empty);
    let reconciliation = reconcile(aggregates.total_m, aggregates.exempted_m, codes);

    let mut per_code = [None; CODE_COUNT];
    for (code, slot) in (0i64..).zip(per_code.iter_mut()) {
        *slot = codes.get(&code).map(|meters| meters / METERS_PER_KM);
    }
    FamilySummary {
        codes: per_code,
        assessed_km: reconciliation.assessed / METERS_PER_KM,
        not_yet_assessed_km: reconciliation.not_yet_assessed / METERS_PER_KM,
    }
}

/// Builds the summary row of one region.
pub fn compose_summary(
    region: &str,
    kind: SourceKind,
    interval: ComputationInterval,
    aggregates: &RegionAggregates,
) -> RegionSummary {
    RegionSummary {
        region: region.to_string(),
        source_kind: kind,
        interval,
        total_km: aggregates.total_m / METERS_PER_KM,
        exempted_km: aggregates.exempted_m / METERS_PER_KM,
        pers: compose_family(aggregates, ClassificationFamily::Pers),
        ofg: compose_family(aggregates, ClassificationFamily::Ofg),
        gw: compose_family(aggregates, ClassificationFamily::Gw),
    }
}
