// Core modules
pub mod core;
pub mod config;
pub mod graph;

// Detection pipeline
pub mod detection;

// Data ingestion
pub mod ingest;

pub mod util;

// Re-export commonly used types for convenience
pub use crate::core::*;
pub use config::{ConfigError, DetectionConfig};
pub use detection::MulingDetectionEngine;
pub use graph::TransferGraph;
pub use ingest::{read_transfers, IngestError, IngestReport};
