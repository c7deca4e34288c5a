//! Two-stage pipeline entry point.
//!
//! [`scan_pipeline`] runs the driver on its own thread so a stage-2 consumer
//! can drain batches concurrently: the producer may be classifying window
//! *k+1* while the consumer is still processing window *k*. The bounded
//! channel provides backpressure; channel disconnection is the termination
//! signal and the join handle carries the driver's verdict.

use std::thread::{self, JoinHandle};

use bytes::Bytes;
use crossbeam_channel::Receiver;

use crate::batch::IndexBatch;
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::scanner::context::ScanContext;
use crate::scanner::engine::{ScanSummary, Scanner};

/// A running document scan: the batch receiver plus the producer's handle.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use structrs::{ScanConfig, scan_pipeline};
///
/// let input = Bytes::from_static(br#"{"items": [true, null]}"#);
/// let pipeline = scan_pipeline(input, ScanConfig::default())?;
///
/// let mut offsets = Vec::new();
/// for batch in pipeline.batches() {
///     offsets.extend(batch.iter());
/// }
/// let summary = pipeline.join()?;
/// assert_eq!(offsets.len() as u64, summary.structural_count);
/// # Ok::<(), structrs::ScanError>(())
/// ```
#[derive(Debug)]
pub struct ScanPipeline {
    receiver: Receiver<IndexBatch>,
    handle: JoinHandle<Result<ScanSummary, ScanError>>,
}

impl ScanPipeline {
    /// The receiving half of the publication channel.
    ///
    /// Iterating it yields batches in input order until the producer closes
    /// the channel. Dropping the receiver (or the whole pipeline without
    /// joining) cancels the scan.
    pub fn batches(&self) -> &Receiver<IndexBatch> {
        &self.receiver
    }

    /// Waits for the producer and returns the scan verdict.
    ///
    /// Drain [`ScanPipeline::batches`] to completion first if you want the
    /// full verdict: `join` drops the receiver before waiting, so batches
    /// still queued are discarded and a producer that is still scanning is
    /// cut short with [`ScanError::ChannelClosed`].
    ///
    /// # Errors
    ///
    /// Any [`ScanError`] from the driver, or [`ScanError::WorkerPanicked`]
    /// if the producer thread panicked.
    pub fn join(self) -> Result<ScanSummary, ScanError> {
        // The producer blocks in publish while the channel is full; holding
        // the receiver across handle.join() would deadlock an undrained
        // pipeline. Dropping it first turns that case into cancellation.
        drop(self.receiver);
        match self.handle.join() {
            Ok(result) => result,
            Err(_) => Err(ScanError::WorkerPanicked),
        }
    }
}

/// Spawns the scan driver on a producer thread.
///
/// The input is a [`Bytes`] handle so the caller keeps shared ownership of
/// the document while the producer scans it.
///
/// # Errors
///
/// Returns [`ScanError::InvalidConfig`] for a bad configuration, or
/// [`ScanError::Io`] if the thread could not be spawned.
pub fn scan_pipeline(input: Bytes, config: ScanConfig) -> Result<ScanPipeline, ScanError> {
    let (ctx, receiver) = ScanContext::new(&config)?;
    let scanner = Scanner::new(config);
    let handle = thread::Builder::new()
        .name("structrs-scan".into())
        .spawn(move || scanner.scan(input.as_ref(), ctx))?;
    Ok(ScanPipeline { receiver, handle })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_roundtrip() {
        let input = Bytes::from_static(b"[1, 2, 3]");
        let pipeline = scan_pipeline(input, ScanConfig::default()).unwrap();

        let offsets: Vec<u64> = pipeline.batches().iter().flat_map(|b| {
            b.offsets().to_vec()
        }).collect();
        assert_eq!(offsets, vec![0, 1, 2, 4, 5, 7, 8]);

        let summary = pipeline.join().unwrap();
        assert_eq!(summary.structural_count, 7);
    }

    #[test]
    fn test_pipeline_error_still_closes_channel() {
        let input = Bytes::from_static(b"   ");
        let pipeline = scan_pipeline(input, ScanConfig::default()).unwrap();

        // Receiver sees disconnection without any batches.
        assert_eq!(pipeline.batches().iter().count(), 0);
        assert!(matches!(
            pipeline.join(),
            Err(ScanError::NoStructuralContent)
        ));
    }

    #[test]
    fn test_join_without_draining_cancels_instead_of_hanging() {
        // Far more batches than the channel can hold, and nothing draining:
        // the producer is parked in publish. join must still return, by
        // cutting the scan short rather than waiting on it.
        let mut doc = Vec::with_capacity(32 * 1024);
        doc.push(b'[');
        while doc.len() < 32 * 1024 - 2 {
            doc.extend_from_slice(b"1234, ");
        }
        doc.extend_from_slice(b"1]");

        let config = ScanConfig::new(64, 2, 2).unwrap();
        let pipeline = scan_pipeline(Bytes::from(doc), config).unwrap();
        assert!(matches!(pipeline.join(), Err(ScanError::ChannelClosed)));
    }

    #[test]
    fn test_dropping_receiver_cancels_scan() {
        // Many windows with a tiny channel: the producer must hit a closed
        // channel and bail with ChannelClosed.
        let mut doc = Vec::with_capacity(64 * 1024);
        doc.push(b'[');
        while doc.len() < 60 * 1024 {
            doc.extend_from_slice(b"1234, ");
        }
        doc.extend_from_slice(b"1]");

        let config = ScanConfig::new(64, 2, 1).unwrap();
        let pipeline = scan_pipeline(Bytes::from(doc), config).unwrap();
        let ScanPipeline { receiver, handle } = pipeline;
        drop(receiver);

        match handle.join().unwrap() {
            Err(ScanError::ChannelClosed) => {}
            other => panic!("expected ChannelClosed, got {:?}", other),
        }
    }
}
