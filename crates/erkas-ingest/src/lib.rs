//! ERKAS region data ingestion.
//!
//! This crate discovers region files and reads them into [`GeoFrame`]s, the
//! common in-memory form of both source kinds.
//!
//! # Features
//!
//! - **Discovery**: Find spreadsheet and GeoJSON deliveries below an input root
//! - **Spreadsheet Loading**: Skip the metadata preamble, drop the row-index
//!   column, build point geometry from coordinate columns
//! - **GeoJSON Store**: Read and write FeatureCollections with a `crs` member
//!
//! # Example
//!
//! ```ignore
//! use std::path::Path;
//! use erkas_ingest::{FileStore, GeoStore, discover_region_files};
//! use erkas_model::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! let store = FileStore::from_config(&config);
//! for file in discover_region_files(Path::new("deliveries"), &config.input)? {
//!     let frame = store.load_region(&file)?;
//!     println!("{}: {} segments", file.region_token, frame.len());
//! }
//! ```

mod discovery;
mod error;
mod frame;
mod geojson;
mod spreadsheet;
mod store;
mod values;

// === Error Types ===
pub use error::{IngestError, Result};

// === Discovery ===
pub use discovery::{RegionFile, discover_region_files, list_region_files, region_token};

// === Frames ===
pub use frame::{Crs, GeoFeature, GeoFrame};

// === Readers and Writers ===
pub use geojson::{read_geojson, to_feature_collection, write_geojson};
pub use spreadsheet::read_spreadsheet;
pub use store::{FileStore, GeoStore};

// === Value Helpers ===
pub use values::{f64_to_json, format_numeric, json_to_string, parse_f64};
