//! Error types for the ostinato streaming core.
//!
//! Two disjoint taxonomies live here. [`TimeRingError`] is the
//! capacity/availability status of the time-indexed ring: every variant is
//! an expected, recoverable outcome the caller must branch on.
//! [`RingError`] and [`WindowError`] are precondition violations — the
//! pipeline was wired incorrectly and setup should abort rather than retry.

use thiserror::Error;

use crate::stream::ElementType;

/// The main error type for all ostinato operations.
#[derive(Error, Debug)]
pub enum OstinatoError {
    /// Error at the byte-ring layer (fatal precondition violation).
    #[error("ring error: {0}")]
    Ring(#[from] RingError),

    /// Capacity/availability status from the time-indexed ring.
    #[error("time ring error: {0}")]
    TimeRing(#[from] TimeRingError),

    /// Error in the windowed framing engine (fatal configuration error).
    #[error("window error: {0}")]
    Window(#[from] WindowError),
}

/// Errors from the low-level byte ring.
///
/// These indicate a caller error, never a wraparound case: wraparound is
/// handled transparently for every request that fits the capacity.
#[derive(Error, Debug)]
pub enum RingError {
    /// A read, write, or zero-fill request was larger than the ring itself.
    #[error("request of {requested} bytes exceeds ring capacity of {capacity} bytes")]
    SizeExceeded {
        /// The requested transfer length in bytes.
        requested: usize,
        /// The fixed ring capacity in bytes.
        capacity: usize,
    },
}

/// Capacity/availability status of a [`TimeRing`](crate::TimeRing) operation.
///
/// All variants are recoverable, expected outcomes; none should abort the
/// process. They are returned, never panicked.
#[derive(Error, Debug)]
pub enum TimeRingError {
    /// The caller-owned source slice is shorter than the requested sample count.
    #[error("input array holds {available} bytes but {required} are required")]
    InputArrayTooSmall {
        /// Bytes available in the caller's slice.
        available: usize,
        /// Bytes required for the requested sample count.
        required: usize,
    },

    /// A push of more samples than the ring can ever hold.
    #[error("push of {count} samples exceeds ring capacity of {capacity} samples")]
    DataExceedsBufferSize {
        /// The pushed sample count.
        count: usize,
        /// The ring capacity in samples.
        capacity: usize,
    },

    /// The requested range ends past the write cursor; data has not been
    /// produced yet. Retry later — the data will eventually arrive.
    #[error("requested samples up to {requested_end} are not in the buffer yet (write cursor at {write_cursor})")]
    DataNotInBufferYet {
        /// One past the last requested logical sample index.
        requested_end: i64,
        /// The current logical write cursor.
        write_cursor: i64,
    },

    /// The requested range starts before the eviction window; the data has
    /// been overwritten. The consumer is too slow relative to the producer —
    /// a sizing/backpressure signal, not a bug.
    #[error("requested samples from {requested_start} are not in the buffer anymore (oldest resident is {oldest})")]
    DataNotInBufferAnymore {
        /// The first requested logical sample index.
        requested_start: i64,
        /// The oldest logical sample index still resident.
        oldest: i64,
    },

    /// The requested duration resolves to zero samples.
    #[error("requested duration resolves to zero samples")]
    DurationTooSmall,

    /// The requested duration resolves to more samples than the ring holds.
    #[error("requested {count} samples but the ring only holds {capacity}")]
    DurationTooLarge {
        /// The requested sample count.
        count: usize,
        /// The ring capacity in samples.
        capacity: usize,
    },
}

/// Fatal configuration errors from the windowed framing engine.
///
/// These are reported before any window is processed; they are not retried
/// or partially tolerated.
#[derive(Error, Debug)]
pub enum WindowError {
    /// The input stream does not contain even one full window.
    #[error("stream too short: {available} samples available, window needs {required}")]
    StreamTooShort {
        /// Samples in the input stream.
        available: usize,
        /// Samples required for one window (frame + delta).
        required: usize,
    },

    /// A multi-channel sample arrived with the wrong number of channels.
    #[error("sample has {found} channels, windower was configured for {expected}")]
    ChannelCountMismatch {
        /// Channels the windower was configured for.
        expected: usize,
        /// Channels found on the sample.
        found: usize,
    },

    /// A per-channel configuration call addressed a channel past the end.
    #[error("channel index {index} out of range ({channels} channels)")]
    ChannelOutOfRange {
        /// The requested channel index.
        index: usize,
        /// The configured channel count.
        channels: usize,
    },

    /// A transformation emitted trailing state whose shape does not match
    /// the output stream it would be appended to.
    #[error("flush output shape mismatch: expected {expected_dim}x{expected_bytes} bytes of {expected_type:?}, got {found_dim}x{found_bytes} bytes of {found_type:?}")]
    ShapeMismatch {
        /// Expected dimension.
        expected_dim: usize,
        /// Expected element byte width.
        expected_bytes: usize,
        /// Expected element type.
        expected_type: ElementType,
        /// Found dimension.
        found_dim: usize,
        /// Found element byte width.
        found_bytes: usize,
        /// Found element type.
        found_type: ElementType,
    },
}

/// Type alias for `Result<T, OstinatoError>`.
pub type Result<T> = std::result::Result<T, OstinatoError>;
