//! Slot pool - reusable index buffers for the scan hot path.

mod pool;

pub use pool::SlotPool;
