//! ERKAS region pipeline.
//!
//! Turns one heterogeneous region dataset into a fixed-shape
//! [`RegionSummary`](erkas_model::RegionSummary):
//!
//! 1. [`schema`] maps source columns onto canonical roles
//! 2. [`compose::check_generation`] gates on the known schema generations
//! 3. [`normalize`] builds the typed segment frame
//! 4. [`aggregate`] sums lengths per exemption token and per code
//! 5. [`reconcile`] splits each family into assessed and not yet assessed
//! 6. [`compose`] assembles the row in kilometers
//!
//! [`RegionProcessor`] runs these stages for one discovered file and writes
//! the per-region subset.

pub mod aggregate;
pub mod attributes;
pub mod cancel;
pub mod compose;
pub mod error;
pub mod normalize;
pub mod reconcile;
pub mod region;
pub mod schema;

pub use aggregate::{sum_by_category, sum_by_code, total_length};
pub use attributes::{UniqueValue, resolve_interval, resolve_region, unique_value};
pub use cancel::CancellationToken;
pub use compose::{RegionAggregates, check_generation, compose_summary};
pub use error::{CoreError, Result};
pub use normalize::{EXEMPT, NOT_EXEMPT, build_segments, normalize_exemption_token};
pub use reconcile::{Reconciliation, reconcile};
pub use region::{ProcessedRegion, RegionAnalysis, RegionProcessor, analyze_region, subset_columns};
pub use schema::{ResolvedSchema, resolve_schema};
