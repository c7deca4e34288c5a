//! The IndexBatch type - the unit handed to the stage-2 consumer.

use std::fmt;
use std::sync::Arc;

use crate::slot::SlotPool;

/// A batch of structural byte offsets found within one scan window.
///
/// Offsets are absolute (relative to the start of the whole input) and
/// strictly increasing. Batches are published in input order, so a consumer
/// that drains the channel in order sees one strictly increasing offset
/// stream covering every structural and pseudo-structural character exactly
/// once.
///
/// The backing storage comes from the scan's [`SlotPool`]. Dropping the batch
/// recycles the storage, which is what allows the producer to reuse a fixed
/// set of buffers instead of allocating per window: hold on to a batch and
/// its buffer stays out of circulation; drop it and the slot returns.
///
/// # Example
///
/// ```
/// use structrs::IndexBatch;
///
/// let batch = IndexBatch::detached(vec![0, 1, 3, 4]);
/// assert_eq!(batch.len(), 4);
/// assert_eq!(batch.first(), Some(0));
/// assert_eq!(batch.last(), Some(4));
/// ```
#[derive(Debug)]
pub struct IndexBatch {
    offsets: Vec<u64>,
    pool: Option<Arc<SlotPool>>,
}

impl IndexBatch {
    /// Creates a batch whose storage returns to `pool` on drop.
    pub(crate) fn pooled(offsets: Vec<u64>, pool: Arc<SlotPool>) -> Self {
        Self {
            offsets,
            pool: Some(pool),
        }
    }

    /// Creates a batch that owns its storage outright.
    ///
    /// Useful in tests and for consumers that build batches themselves; the
    /// scanner always produces pooled batches.
    pub fn detached(offsets: Vec<u64>) -> Self {
        Self {
            offsets,
            pool: None,
        }
    }

    /// Returns the offsets in this batch.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }

    /// Returns the number of offsets in this batch.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Returns true if the batch holds no offsets.
    ///
    /// The scanner never publishes empty batches; this exists for detached
    /// batches built by callers.
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns the first offset, if any.
    pub fn first(&self) -> Option<u64> {
        self.offsets.first().copied()
    }

    /// Returns the last offset, if any.
    pub fn last(&self) -> Option<u64> {
        self.offsets.last().copied()
    }

    /// Returns an iterator over the offsets.
    pub fn iter(&self) -> std::iter::Copied<std::slice::Iter<'_, u64>> {
        self.offsets.iter().copied()
    }
}

impl AsRef<[u64]> for IndexBatch {
    fn as_ref(&self) -> &[u64] {
        &self.offsets
    }
}

impl Drop for IndexBatch {
    fn drop(&mut self) {
        if let Some(pool) = self.pool.take() {
            pool.recycle(std::mem::take(&mut self.offsets));
        }
    }
}

impl fmt::Display for IndexBatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IndexBatch({} offsets", self.len())?;
        if let (Some(first), Some(last)) = (self.first(), self.last()) {
            write!(f, " @ {}..={}", first, last)?;
        }
        write!(f, ")")
    }
}
