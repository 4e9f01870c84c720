//! Error types for the `photosim-trials` crate.

/// Errors that can occur while recording or persisting trials.
#[derive(Debug, thiserror::Error)]
pub enum TrialError {
    /// A day point was recorded out of sequence.
    #[error("non-contiguous day: expected day {expected}, got {got}")]
    NonContiguousDay {
        /// The only day index that may be recorded next.
        expected: u32,
        /// The day index the caller tried to record.
        got: u32,
    },

    /// Totals handed to the recorder violated `stored == created - used`.
    #[error("unbalanced totals at day {day}: created {created} - used {used} != stored {stored}")]
    Unbalanced {
        /// The day being recorded.
        day: u32,
        /// Cumulative created value.
        created: i64,
        /// Cumulative used value.
        used: i64,
        /// Stored value that did not match.
        stored: i64,
    },

    /// The day counter would overflow.
    #[error("day counter overflow")]
    DayOverflow,

    /// A persistence sink could not be opened.
    #[error("failed to open trial sink: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },
}
