//! Caller-owned context for one document scan.

use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, bounded};

use crate::batch::IndexBatch;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::slot::SlotPool;

/// Shared resources for exactly one document scan.
///
/// Owns the slot pool and the sending half of the bounded publication
/// channel. [`Scanner::scan`](crate::Scanner::scan) consumes the context, so
/// the channel is closed when the scan returns - on success and on every
/// error path alike - and the consumer can treat disconnection as the sole
/// termination signal.
///
/// A context must not be reused: create one per scan.
///
/// # Example
///
/// ```
/// use structrs::{ScanConfig, ScanContext, Scanner};
///
/// let config = ScanConfig::default();
/// let (ctx, rx) = ScanContext::new(&config)?;
/// let summary = Scanner::new(config).scan(b"[1, 2]", ctx)?;
///
/// let offsets: Vec<u64> = rx.iter().flat_map(|b| b.iter().collect::<Vec<_>>()).collect();
/// assert_eq!(offsets, vec![0, 1, 2, 4, 5]);
/// assert_eq!(summary.structural_count, 5);
/// # Ok::<(), structrs::ScanError>(())
/// ```
#[derive(Debug)]
pub struct ScanContext {
    pool: Arc<SlotPool>,
    tx: Sender<IndexBatch>,
}

impl ScanContext {
    /// Creates a context and the receiving half of its publication channel.
    ///
    /// The channel is bounded by `config.channel_capacity()`, which is what
    /// backpressures the producer when the consumer lags.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidConfig`] if the configuration fails
    /// [`ScanConfig::validate`].
    pub fn new(config: &ScanConfig) -> Result<(Self, Receiver<IndexBatch>), ScanError> {
        config.validate()?;
        let (tx, rx) = bounded(config.channel_capacity());
        let pool = Arc::new(SlotPool::new(config.pool_depth(), config.window_bytes()));
        Ok((Self { pool, tx }, rx))
    }

    /// The slot pool backing this scan's batches.
    pub fn pool(&self) -> &Arc<SlotPool> {
        &self.pool
    }

    /// Claims an offset buffer for the next window.
    pub(crate) fn claim(&self) -> Vec<u64> {
        self.pool.claim()
    }

    /// Returns an unpublished buffer to the pool.
    pub(crate) fn recycle(&self, storage: Vec<u64>) {
        self.pool.recycle(storage);
    }

    /// Publishes a non-empty batch, blocking while the channel is full.
    ///
    /// A disconnected receiver maps to [`ScanError::ChannelClosed`]; dropping
    /// the receiver is the supported cancellation path.
    pub(crate) fn publish(&self, offsets: Vec<u64>) -> Result<(), ScanError> {
        let batch = IndexBatch::pooled(offsets, Arc::clone(&self.pool));
        self.tx.send(batch).map_err(|_| ScanError::ChannelClosed)
    }
}
