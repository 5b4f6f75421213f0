//! Per-region summary values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::columns::CODE_COUNT;
use crate::role::ClassificationFamily;
use crate::source::SourceKind;

/// Text written for an interval that differs between segments of one region.
pub const VARIABLE_INTERVAL: &str = "variabel";

/// Nominal computation interval of a region.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ComputationInterval {
    /// Every segment shares this interval (meters).
    Fixed(f64),
    /// Segments carry more than one distinct interval.
    Variable,
    /// No interval column or no values.
    #[default]
    Unknown,
}

impl fmt::Display for ComputationInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ComputationInterval::Fixed(value) => write!(f, "{value}"),
            ComputationInterval::Variable => f.write_str(VARIABLE_INTERVAL),
            ComputationInterval::Unknown => Ok(()),
        }
    }
}

/// Length distribution of one classification family, in kilometers.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FamilySummary {
    /// Length per code 0..=5; `None` when no segment carries the code.
    pub codes: [Option<f64>; CODE_COUNT],
    /// Codes 1 through 4 combined.
    pub assessed_km: f64,
    /// Residual: total minus exempted minus assessed.
    pub not_yet_assessed_km: f64,
}

impl FamilySummary {
    pub fn code_km(&self, code: usize) -> Option<f64> {
        self.codes.get(code).copied().flatten()
    }
}

/// One row of a summary table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionSummary {
    pub region: String,
    pub source_kind: SourceKind,
    pub interval: ComputationInterval,
    pub total_km: f64,
    pub exempted_km: f64,
    pub pers: FamilySummary,
    pub ofg: FamilySummary,
    pub gw: FamilySummary,
}

impl RegionSummary {
    pub fn family(&self, family: ClassificationFamily) -> &FamilySummary {
        match family {
            ClassificationFamily::Pers => &self.pers,
            ClassificationFamily::Ofg => &self.ofg,
            ClassificationFamily::Gw => &self.gw,
        }
    }

    /// Checks `total = exempted + assessed + not_yet_assessed` for every family.
    pub fn is_conserved(&self, tolerance_km: f64) -> bool {
        ClassificationFamily::ALL.iter().all(|family| {
            let summary = self.family(*family);
            let sum = self.exempted_km + summary.assessed_km + summary.not_yet_assessed_km;
            (self.total_km - sum).abs() <= tolerance_km
        })
    }
}
