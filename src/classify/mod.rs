//! Word-parallel byte classification.
//!
//! One classifier call covers a window of input and produces the offsets of
//! every structural and pseudo-structural character in it, carrying just
//! enough state ([`ScanState`]) to resume at the next window without
//! re-scanning prior bytes.

mod block;
mod state;

pub use block::{BLOCK_SIZE, classify_window};
pub use state::ScanState;
