//! Error types for structrs.

use std::fmt;

/// Errors that can occur while scanning a document.
///
/// Every scan failure is terminal for the whole document: nothing is retried
/// and the publication channel is always closed before the error is returned,
/// so a consumer can rely on channel disconnection as its sole termination
/// signal in both the success and failure cases.
#[derive(Debug)]
pub enum ScanError {
    /// An I/O error occurred, e.g. while spawning the producer thread.
    Io(std::io::Error),

    /// Invalid configuration parameter.
    InvalidConfig {
        /// Description of what was invalid.
        message: &'static str,
    },

    /// The input contains bytes that are not valid UTF-8.
    InvalidEncoding {
        /// Byte offset of the first offending sequence.
        offset: usize,
    },

    /// The input ended while still inside an open quoted string.
    UnterminatedString,

    /// No structural character was found in the entire input
    /// (empty or whitespace-only documents).
    NoStructuralContent,

    /// A raw control byte (code point < 0x20) appeared inside a quoted
    /// string without being escaped.
    UnescapedControlByte,

    /// The last structural byte does not pair with the opening one
    /// (`{` must close with `}`, `[` with `]`).
    MismatchedContainer {
        /// First structural byte of the document.
        opening: u8,
        /// Last structural byte of the document.
        closing: u8,
    },

    /// The consumer side of the publication channel disconnected before the
    /// scan finished. Dropping the receiver is the supported way to cancel a
    /// running scan.
    ChannelClosed,

    /// The producer thread panicked.
    WorkerPanicked,
}

impl fmt::Display for ScanError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScanError::Io(e) => write!(f, "io error: {}", e),
            ScanError::InvalidConfig { message } => {
                write!(f, "invalid config: {}", message)
            }
            ScanError::InvalidEncoding { offset } => {
                write!(f, "invalid utf-8 at byte {}", offset)
            }
            ScanError::UnterminatedString => {
                write!(f, "input ended inside an unterminated string")
            }
            ScanError::NoStructuralContent => {
                write!(f, "no structural characters found")
            }
            ScanError::UnescapedControlByte => {
                write!(f, "unescaped control byte inside a string")
            }
            ScanError::MismatchedContainer { opening, closing } => {
                write!(
                    f,
                    "container mismatch: opened with {:?}, last structural byte {:?}",
                    char::from(*opening),
                    char::from(*closing)
                )
            }
            ScanError::ChannelClosed => {
                write!(f, "consumer disconnected before the scan finished")
            }
            ScanError::WorkerPanicked => write!(f, "scan worker panicked"),
        }
    }
}

impl std::error::Error for ScanError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScanError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ScanError {
    fn from(e: std::io::Error) -> Self {
        ScanError::Io(e)
    }
}
