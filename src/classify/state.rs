//! Carried classification state.

/// State carried across window boundaries.
///
/// Owned by the driver and passed by reference into every classifier call.
/// Three booleans are enough to resume classification mid-document; the
/// fourth is the sticky error flag for control bytes found inside strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanState {
    /// Previous window ended partway through an odd-length backslash run,
    /// so the first byte of the next window is escaped.
    pub(crate) ends_odd_backslash: bool,

    /// Previous window ended inside an open quoted string.
    pub(crate) inside_quote: bool,

    /// Previous window ended on a pseudo-structural predecessor (whitespace
    /// or a structural character). Start of input counts as a predecessor.
    pub(crate) ends_pseudo_pred: bool,

    /// Sticky: a raw control byte (< 0x20) was seen inside a string.
    /// Once set it never clears; the driver checks it after the loop.
    pub(crate) error: bool,
}

impl ScanState {
    /// Fresh state for the start of a document.
    pub fn new() -> Self {
        Self {
            ends_odd_backslash: false,
            inside_quote: false,
            ends_pseudo_pred: true,
            error: false,
        }
    }

    /// True if the last classified byte was inside an open string.
    pub fn inside_quote(&self) -> bool {
        self.inside_quote
    }

    /// True if any classified window contained a raw control byte inside a
    /// string.
    pub fn control_error(&self) -> bool {
        self.error
    }
}

impl Default for ScanState {
    fn default() -> Self {
        Self::new()
    }
}
