//! Data model shared by the ERKAS statistics crates.

pub mod columns;
pub mod config;
pub mod error;
pub mod layout;
pub mod manifest;
pub mod role;
pub mod source;
pub mod summary;

pub use config::{
    DEFAULT_CRS, ExemptionTokens, GenerationSignature, GenerationSignatures, InputLayout,
    PipelineConfig, RoleFragments, SchemaGeneration, SpreadsheetLayout,
};
pub use error::{ModelError, Result};
pub use layout::OutputLayout;
pub use manifest::{SkipCategory, SkippedRegion};
pub use role::{ClassificationFamily, Role};
pub use source::SourceKind;
pub use summary::{ComputationInterval, FamilySummary, RegionSummary, VARIABLE_INTERVAL};
