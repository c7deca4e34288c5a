//! The IndexBatch type - one window's worth of structural offsets.

mod data;

pub use data::IndexBatch;
