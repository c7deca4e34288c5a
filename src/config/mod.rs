//! Configuration for scanning behavior.
//!
//! This module provides [`ScanConfig`], which controls how the driver walks
//! the input and how the producer/consumer pipeline is provisioned:
//!
//! - `window_bytes` - How many bytes each classifier call covers
//! - `pool_depth` - How many reusable index buffers the slot pool holds
//! - `channel_capacity` - Bound on in-flight batches in the publication channel
//!
//! # Example
//!
//! ```
//! use structrs::ScanConfig;
//!
//! // Custom window and pipeline sizing
//! let config = ScanConfig::new(8192, 16, 8)?;
//!
//! // Builder pattern
//! let config = ScanConfig::default().with_window_bytes(1024);
//! # Ok::<(), structrs::ScanError>(())
//! ```

use crate::classify::BLOCK_SIZE;
use crate::error::ScanError;

/// Default window size handed to the classifier per call (4 KiB).
pub const DEFAULT_WINDOW_BYTES: usize = 4 * 1024;

/// Default slot pool depth.
pub const DEFAULT_POOL_DEPTH: usize = 8;

/// Default publication channel capacity.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 8;

/// Configuration for a document scan.
///
/// # Constraints
///
/// - `window_bytes` must be a non-zero multiple of [`BLOCK_SIZE`] so the
///   classifier only ever pads the final block of the whole input.
/// - `pool_depth` and `channel_capacity` must be non-zero.
/// - `channel_capacity` must not exceed `pool_depth`. The channel bound is
///   what keeps the number of in-flight batches below the number of pooled
///   buffers; allowing it to grow past the pool would make every claim fall
///   back to a fresh allocation once the consumer lags.
///
/// # Example
///
/// ```
/// use structrs::ScanConfig;
///
/// let config = ScanConfig::default()
///     .with_window_bytes(2048)
///     .with_pool_depth(4)
///     .with_channel_capacity(4);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScanConfig {
    /// Bytes covered by one classifier call.
    window_bytes: usize,

    /// Number of reusable index buffers in the slot pool.
    pool_depth: usize,

    /// Capacity of the bounded publication channel.
    channel_capacity: usize,
}

impl ScanConfig {
    /// Creates a new configuration with the specified sizing.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError::InvalidConfig`] if:
    /// - `window_bytes` is zero or not a multiple of [`BLOCK_SIZE`]
    /// - `pool_depth` or `channel_capacity` is zero
    /// - `channel_capacity` exceeds `pool_depth`
    ///
    /// # Example
    ///
    /// ```
    /// use structrs::ScanConfig;
    ///
    /// let config = ScanConfig::new(4096, 8, 8)?;
    /// assert_eq!(config.window_bytes(), 4096);
    /// # Ok::<(), structrs::ScanError>(())
    /// ```
    pub fn new(
        window_bytes: usize,
        pool_depth: usize,
        channel_capacity: usize,
    ) -> Result<Self, ScanError> {
        if window_bytes == 0 || window_bytes % BLOCK_SIZE != 0 {
            return Err(ScanError::InvalidConfig {
                message: "window_bytes must be a non-zero multiple of the classifier block size",
            });
        }

        if pool_depth == 0 {
            return Err(ScanError::InvalidConfig {
                message: "pool_depth must be non-zero",
            });
        }

        if channel_capacity == 0 {
            return Err(ScanError::InvalidConfig {
                message: "channel_capacity must be non-zero",
            });
        }

        if channel_capacity > pool_depth {
            return Err(ScanError::InvalidConfig {
                message: "channel_capacity must not exceed pool_depth",
            });
        }

        Ok(Self {
            window_bytes,
            pool_depth,
            channel_capacity,
        })
    }

    /// Sets the window size in bytes.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`ScanConfig::validate`] to check if the configuration is valid.
    pub fn with_window_bytes(mut self, bytes: usize) -> Self {
        self.window_bytes = bytes;
        self
    }

    /// Sets the slot pool depth.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`ScanConfig::validate`] to check if the configuration is valid.
    pub fn with_pool_depth(mut self, depth: usize) -> Self {
        self.pool_depth = depth;
        self
    }

    /// Sets the publication channel capacity.
    ///
    /// Note: This does not validate the configuration. Use
    /// [`ScanConfig::validate`] to check if the configuration is valid.
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity;
        self
    }

    /// Returns the window size in bytes.
    pub fn window_bytes(&self) -> usize {
        self.window_bytes
    }

    /// Returns the slot pool depth.
    pub fn pool_depth(&self) -> usize {
        self.pool_depth
    }

    /// Returns the publication channel capacity.
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
    }

    /// Validates the current configuration.
    ///
    /// Returns an error if the configuration is invalid.
    ///
    /// # Example
    ///
    /// ```
    /// use structrs::ScanConfig;
    ///
    /// let config = ScanConfig::default().with_window_bytes(100);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ScanError> {
        Self::new(self.window_bytes, self.pool_depth, self.channel_capacity).map(|_| ())
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            window_bytes: DEFAULT_WINDOW_BYTES,
            pool_depth: DEFAULT_POOL_DEPTH,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}
