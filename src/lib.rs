//! structrs
//!
//! Pipeline-parallel stage-1 JSON scanning for Rust.
//!
//! `structrs` scans an in-memory JSON document and emits the byte offsets of
//! every *structural* character (`{ } [ ] : , "`) and *pseudo-structural*
//! character (the first byte of a bare literal such as `true` or `42`),
//! validating well-formedness at the character-class level as it goes:
//! balanced quoting, a matching outermost container, valid UTF-8, no raw
//! control bytes inside strings. A stage-2 consumer turns those offsets into
//! a value tree; that consumer is out of scope here.
//!
//! The crate intentionally:
//! - does NOT parse number or string contents
//! - does NOT decode escape sequences
//! - does NOT build the value tree
//! - does NOT manage files or sourcing the input
//!
//! It only does one thing: **bytes in → structural index batches out**
//!
//! Classification is word-parallel: each 64-byte block becomes a handful of
//! `u64` bitmasks and string/escape resolution is carry arithmetic, not a
//! per-byte branch. Offsets are published in fixed-size batches whose
//! storage comes from a reusable slot pool, over a bounded channel that
//! backpressures the producer when the consumer lags.
//!
//! # Sync
//!
//! ```
//! use structrs::{ScanConfig, Scanner};
//!
//! fn main() -> Result<(), structrs::ScanError> {
//!     let scanner = Scanner::new(ScanConfig::default());
//!     let offsets = scanner.scan_to_vec(br#"{"a": 1}"#)?;
//!     println!("{} structural characters", offsets.len());
//!     Ok(())
//! }
//! ```
//!
//! # Pipeline
//!
//! ```
//! use bytes::Bytes;
//! use structrs::{ScanConfig, scan_pipeline};
//!
//! fn main() -> Result<(), structrs::ScanError> {
//!     let input = Bytes::from_static(br#"[1, 2, 3]"#);
//!     let pipeline = scan_pipeline(input, ScanConfig::default())?;
//!
//!     // Stage 2 drains batches while the producer keeps scanning.
//!     for batch in pipeline.batches() {
//!         println!("batch: {}", batch);
//!     }
//!     let summary = pipeline.join()?;
//!     println!("{} offsets in {} batches", summary.structural_count, summary.batches);
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod batch;
mod config;
mod error;
mod scanner;

mod classify; // internal bitmask classifier
mod slot; // internal (pooled index buffers)

//
// Public surface (intentionally tiny)
//

pub use batch::IndexBatch;
pub use classify::{BLOCK_SIZE, ScanState, classify_window};
pub use config::ScanConfig;
pub use error::ScanError;
pub use scanner::{ScanContext, ScanPipeline, ScanSummary, Scanner, scan_pipeline};
pub use slot::SlotPool;
