//! Core scan driver.
//!
//! The driver walks the input window by window, feeding each window to the
//! bitmask classifier with the carried [`ScanState`], validating UTF-8 as it
//! goes, and publishing each non-empty batch of offsets to the consumer
//! channel. Character-class well-formedness (balanced quoting, matching
//! outermost container, no raw control bytes in strings) is decided here
//! after the loop; the classifier itself never fails.
//!
//! # Example
//!
//! ```
//! use structrs::{ScanConfig, Scanner};
//!
//! let scanner = Scanner::new(ScanConfig::default());
//! let offsets = scanner.scan_to_vec(br#"{"a": [1, 2]}"#)?;
//! assert_eq!(offsets, vec![0, 1, 3, 4, 6, 7, 8, 10, 11, 12]);
//! # Ok::<(), structrs::ScanError>(())
//! ```

use crate::classify::{ScanState, classify_window};
use crate::config::ScanConfig;
use crate::error::ScanError;
use crate::scanner::context::ScanContext;

/// Totals reported by a completed scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanSummary {
    /// Structural and pseudo-structural characters published.
    pub structural_count: u64,

    /// Batches published to the consumer channel.
    pub batches: u64,

    /// Bytes of input scanned.
    pub bytes_scanned: u64,
}

/// The stage-1 scan driver.
///
/// `Scanner` holds a [`ScanConfig`] and runs the window loop over one
/// in-memory document per call. It is the producer half of the two-stage
/// pipeline: while a consumer drains the channel created alongside the
/// [`ScanContext`], the scanner may already be classifying the next window.
///
/// # Example
///
/// ```
/// use structrs::{ScanConfig, ScanContext, ScanError, Scanner};
///
/// let config = ScanConfig::default();
/// let (ctx, rx) = ScanContext::new(&config)?;
/// let scanner = Scanner::new(config);
///
/// let err = scanner.scan(b"   ", ctx).unwrap_err();
/// assert!(matches!(err, ScanError::NoStructuralContent));
/// // The channel is closed even though the scan failed.
/// assert!(rx.recv().is_err());
/// # Ok::<(), structrs::ScanError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
}

impl Scanner {
    /// Creates a new scanner with the given configuration.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration used by this scanner.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scans one document, publishing structural index batches to the
    /// context's channel.
    ///
    /// The context is consumed so that the channel closes when this returns,
    /// regardless of outcome. Batches are published in input order with
    /// strictly increasing absolute offsets; the final batch is withheld if
    /// the document ends inside an unterminated string, since its offsets
    /// could send a consumer past the end of valid structural data.
    ///
    /// # Errors
    ///
    /// - [`ScanError::InvalidConfig`] if the configuration is invalid
    /// - [`ScanError::InvalidEncoding`] on the first window that is not
    ///   valid UTF-8 (fatal immediately)
    /// - [`ScanError::UnterminatedString`], [`ScanError::NoStructuralContent`],
    ///   [`ScanError::UnescapedControlByte`] and
    ///   [`ScanError::MismatchedContainer`] per the end-of-input checks
    /// - [`ScanError::ChannelClosed`] if the consumer disconnected, which is
    ///   also the cancellation path
    pub fn scan(&self, input: &[u8], ctx: ScanContext) -> Result<ScanSummary, ScanError> {
        self.config.validate()?;

        let mut state = ScanState::new();
        let mut opening: Option<u8> = None;
        let mut last_structural: Option<u64> = None;
        let mut structural_count: u64 = 0;
        let mut batches: u64 = 0;
        let mut pos = 0usize;
        let mut utf8_watermark = 0usize;
        let window_bytes = self.config.window_bytes();

        while pos < input.len() {
            let end = usize::min(pos + window_bytes, input.len());
            let mut storage = ctx.claim();

            classify_window(&input[pos..end], pos as u64, &mut state, &mut storage);
            utf8_watermark = validate_utf8(input, utf8_watermark, end)?;

            if opening.is_none() {
                if let Some(&first) = storage.first() {
                    opening = Some(input[first as usize]);
                }
            }
            if let Some(&last) = storage.last() {
                last_structural = Some(last);
            }

            pos = end;

            // An unmatched quote at the end of input: withhold the final
            // batch so stage 2 cannot read past the end of valid data.
            let suppress = state.inside_quote() && pos == input.len();
            if !suppress && !storage.is_empty() {
                structural_count += storage.len() as u64;
                batches += 1;
                ctx.publish(storage)?;
            } else {
                ctx.recycle(storage);
            }
        }

        if utf8_watermark < input.len() {
            // Multi-byte sequence truncated by end of input.
            return Err(ScanError::InvalidEncoding {
                offset: utf8_watermark,
            });
        }
        if state.inside_quote() {
            return Err(ScanError::UnterminatedString);
        }
        if structural_count == 0 {
            return Err(ScanError::NoStructuralContent);
        }
        if state.control_error() {
            return Err(ScanError::UnescapedControlByte);
        }

        let (Some(opening), Some(last)) = (opening, last_structural) else {
            return Err(ScanError::NoStructuralContent);
        };
        let closing = input[last as usize];
        if !matching_containers(opening, closing) {
            return Err(ScanError::MismatchedContainer { opening, closing });
        }

        Ok(ScanSummary {
            structural_count,
            batches,
            bytes_scanned: input.len() as u64,
        })
    }

    /// Scans a document and collects every published offset into one vector.
    ///
    /// Convenience wrapper for callers that do not need the pipeline: the
    /// channel is drained by a scoped collector thread while the scan runs
    /// on the calling thread.
    ///
    /// # Errors
    ///
    /// Same as [`Scanner::scan`].
    pub fn scan_to_vec(&self, input: &[u8]) -> Result<Vec<u64>, ScanError> {
        let (ctx, rx) = ScanContext::new(&self.config)?;
        std::thread::scope(|scope| {
            let collector = scope.spawn(move || {
                let mut all = Vec::new();
                for batch in rx {
                    all.extend_from_slice(batch.offsets());
                }
                all
            });

            let summary = self.scan(input, ctx);
            let offsets = collector.join().map_err(|_| ScanError::WorkerPanicked)?;
            summary.map(|_| offsets)
        })
    }
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

/// Whether the outermost container opens and closes with a matching pair.
fn matching_containers(opening: u8, closing: u8) -> bool {
    matches!((opening, closing), (b'{', b'}') | (b'[', b']'))
}

/// Validates UTF-8 over `input[from..to]`, returning the new watermark.
///
/// A multi-byte sequence that is merely cut off by the window boundary is
/// not an error yet: the watermark stays at its first byte and the next call
/// re-validates from there. A sequence that can never become valid aborts
/// the scan.
fn validate_utf8(input: &[u8], from: usize, to: usize) -> Result<usize, ScanError> {
    match std::str::from_utf8(&input[from..to]) {
        Ok(_) => Ok(to),
        Err(e) => match e.error_len() {
            Some(_) => Err(ScanError::InvalidEncoding {
                offset: from + e.valid_up_to(),
            }),
            None => Ok(from + e.valid_up_to()),
        },
    }
}
