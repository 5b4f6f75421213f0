//! CLI library components for the ERKAS pipeline.

pub mod logging;
pub mod pipeline;
pub mod types;
