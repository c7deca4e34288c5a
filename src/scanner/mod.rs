//! Scan driver - window loop, validation, publication.

mod context;
mod engine;
mod pipeline;

pub use context::ScanContext;
pub use engine::{ScanSummary, Scanner};
pub use pipeline::{ScanPipeline, scan_pipeline};
