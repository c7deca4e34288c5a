//! Lock-free pool of reusable offset buffers.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam_queue::ArrayQueue;

/// A fixed-depth pool of reusable offset buffers.
///
/// The driver claims one buffer per scan window so the classifier never
/// allocates on the hot path. Claiming is an atomic fetch-and-increment of
/// the claim counter plus a pop from a lock-free free list; recycling (via
/// [`IndexBatch`](crate::IndexBatch) drop) pushes the cleared buffer back.
///
/// A buffer that has been claimed is out of the pool entirely until the
/// consumer drops the batch that owns it, so a slow consumer can never have
/// its batch overwritten. If the pool is momentarily exhausted - more
/// batches in flight than the pool is deep - `claim` falls back to a fresh
/// allocation rather than blocking or aliasing a live buffer. Pairing the
/// publication channel capacity with the pool depth (see
/// [`ScanConfig`](crate::ScanConfig)) keeps that fallback off the steady
/// state.
#[derive(Debug)]
pub struct SlotPool {
    free: ArrayQueue<Vec<u64>>,
    claims: AtomicU64,
    slot_capacity: usize,
}

impl SlotPool {
    /// Creates a pool of `depth` buffers, each pre-sized to hold
    /// `slot_capacity` offsets.
    ///
    /// `slot_capacity` should be the worst case for one window: every byte
    /// structural, i.e. the window size in bytes.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is zero. [`ScanConfig`](crate::ScanConfig)
    /// validation rejects that before a scan gets here.
    pub fn new(depth: usize, slot_capacity: usize) -> Self {
        let free = ArrayQueue::new(depth);
        for _ in 0..depth {
            // Cannot fail: the queue was just sized to hold exactly these.
            let _ = free.push(Vec::with_capacity(slot_capacity));
        }
        Self {
            free,
            claims: AtomicU64::new(0),
            slot_capacity,
        }
    }

    /// Claims a buffer for the next scan window.
    pub fn claim(&self) -> Vec<u64> {
        self.claims.fetch_add(1, Ordering::Relaxed);
        self.free
            .pop()
            .unwrap_or_else(|| Vec::with_capacity(self.slot_capacity))
    }

    /// Returns a buffer to the pool, clearing it first.
    ///
    /// If the pool is already full (the buffer came from the allocation
    /// fallback), the buffer is simply dropped.
    pub fn recycle(&self, mut storage: Vec<u64>) {
        storage.clear();
        let _ = self.free.push(storage);
    }

    /// Total number of claims made over the pool's lifetime.
    pub fn claims(&self) -> u64 {
        self.claims.load(Ordering::Relaxed)
    }

    /// Number of buffers currently available for claiming.
    pub fn available(&self) -> usize {
        self.free.len()
    }

    /// The pool depth it was created with.
    pub fn depth(&self) -> usize {
        self.free.capacity()
    }
}
