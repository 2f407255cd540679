//! Time-indexed ring buffer over a [`ByteRing`].
//!
//! [`TimeRing`] adds sample semantics to the raw byte store: a sample
//! dimension, element type and rate, conversion between wall-clock time and
//! logical sample indices, a monotonic write cursor, and drift
//! resynchronization. Producers `push` samples, consumers read copies by
//! time range or by absolute sample index.
//!
//! # Key invariants
//!
//! - The write cursor counts every sample ever pushed since the last reset;
//!   it is never wrapped. The physical slot of sample `s` is
//!   `s % capacity_samples`.
//! - Sample `s` is readable iff
//!   `write_cursor - capacity_samples <= s < write_cursor`. Anything older
//!   has been overwritten (the sole eviction mechanism); anything newer has
//!   not been produced.
//! - `offset_samples` is a signed correction term mapping logical indices
//!   to wall-clock time; [`TimeRing::resync`] adjusts it without touching
//!   data or the write cursor.
//!
//! # Thread Safety
//!
//! TimeRing is not internally synchronized: at most one writer, and no
//! concurrent reader during a write. [`SharedTimeRing`](crate::SharedTimeRing)
//! wraps the ring in that contract.

use serde::{Deserialize, Serialize};

use crate::error::TimeRingError;
use crate::ring::ByteRing;
use crate::stream::{ElementType, Stream};

/// Rounds `time * rate` half-up to a sample count.
#[inline]
#[allow(clippy::cast_possible_truncation)] // rounded sample indices fit i64
fn round_samples(time: f64, rate: f64) -> i64 {
    (time * rate + 0.5).floor() as i64
}

/// Declarative configuration for a [`TimeRing`], loadable from JSON by the
/// surrounding pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeRingConfig {
    /// Ring capacity in seconds (rounded half-up against the rate).
    pub capacity_seconds: f64,
    /// Samples per second.
    pub sample_rate: f64,
    /// Elements per sample.
    pub dimension: usize,
    /// Element type; the byte width is derived from it.
    pub element_type: ElementType,
}

/// A fixed-capacity, time-indexed ring buffer for one sensor stream.
///
/// Consumers never receive a live view into the store: every read copies
/// into a caller-owned, explicitly growable [`Stream`].
#[derive(Debug)]
pub struct TimeRing {
    ring: ByteRing,
    capacity_samples: usize,
    sample_rate: f64,
    sample_duration: f64,
    element_bytes: usize,
    element_type: ElementType,
    dimension: usize,
    frame_bytes: usize,
    filled: bool,
    write_cursor: i64,
    last_read_cursor: i64,
    offset_samples: i64,
}

impl TimeRing {
    /// Creates a ring holding `capacity_samples` samples.
    ///
    /// # Panics
    ///
    /// Panics if `capacity_samples`, `dimension`, or `element_bytes` is zero,
    /// or if `sample_rate` is not strictly positive — a ring with no slots or
    /// no timebase cannot satisfy any read.
    pub fn new_by_samples(
        capacity_samples: usize,
        sample_rate: f64,
        dimension: usize,
        element_bytes: usize,
        element_type: ElementType,
    ) -> Self {
        assert!(capacity_samples > 0, "ring capacity must be non-zero");
        assert!(dimension > 0 && element_bytes > 0, "sample shape must be non-zero");
        assert!(sample_rate > 0.0, "sample rate must be positive");

        let frame_bytes = element_bytes * dimension;
        Self {
            ring: ByteRing::new(capacity_samples * frame_bytes),
            capacity_samples,
            sample_rate,
            sample_duration: 1.0 / sample_rate,
            element_bytes,
            element_type,
            dimension,
            frame_bytes,
            filled: false,
            write_cursor: 0,
            last_read_cursor: 0,
            offset_samples: 0,
        }
    }

    /// Creates a ring holding `capacity_seconds` of samples at `sample_rate`
    /// (`capacity_seconds * sample_rate`, rounded half-up).
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`TimeRing::new_by_samples`].
    #[allow(clippy::cast_sign_loss)] // positive by the rate/seconds asserts
    pub fn new_by_duration(
        capacity_seconds: f64,
        sample_rate: f64,
        dimension: usize,
        element_bytes: usize,
        element_type: ElementType,
    ) -> Self {
        assert!(sample_rate > 0.0, "sample rate must be positive");
        let capacity_samples = round_samples(capacity_seconds, sample_rate).max(0) as usize;
        Self::new_by_samples(
            capacity_samples,
            sample_rate,
            dimension,
            element_bytes,
            element_type,
        )
    }

    /// Creates a ring from a declarative [`TimeRingConfig`].
    ///
    /// # Panics
    ///
    /// Panics under the same conditions as [`TimeRing::new_by_samples`].
    pub fn from_config(config: &TimeRingConfig) -> Self {
        Self::new_by_duration(
            config.capacity_seconds,
            config.sample_rate,
            config.dimension,
            config.element_type.size(),
            config.element_type,
        )
    }

    /// Physical byte position of a logical sample index.
    ///
    /// Wraps the sample index first so that indices before the first write
    /// (negative after offset subtraction) land on the zero-initialized
    /// store.
    #[inline]
    #[allow(clippy::cast_sign_loss)] // rem_euclid result is non-negative
    fn byte_position(&self, sample: i64) -> u64 {
        sample.rem_euclid(self.capacity_samples as i64) as u64 * self.frame_bytes as u64
    }

    /// Appends `count` samples from `samples` at the write cursor.
    ///
    /// Once the ring has wrapped, every push unconditionally overwrites the
    /// oldest resident samples; this is the sole eviction mechanism. The
    /// capacity check is against the total capacity, not the space remaining
    /// before the next unread sample, so a push can evict data a slow
    /// consumer was about to read (see [`TimeRingError::DataNotInBufferAnymore`]).
    ///
    /// # Errors
    ///
    /// - [`TimeRingError::DataExceedsBufferSize`] if `count` exceeds the
    ///   ring capacity.
    /// - [`TimeRingError::InputArrayTooSmall`] if `samples` holds fewer than
    ///   `count * frame_bytes` bytes.
    pub fn push(&mut self, samples: &[u8], count: usize) -> Result<(), TimeRingError> {
        if count > self.capacity_samples {
            return Err(TimeRingError::DataExceedsBufferSize {
                count,
                capacity: self.capacity_samples,
            });
        }
        let required = count * self.frame_bytes;
        if samples.len() < required {
            return Err(TimeRingError::InputArrayTooSmall {
                available: samples.len(),
                required,
            });
        }

        let position = self.byte_position(self.write_cursor);
        self.ring.copy_in(&samples[..required], position);
        self.advance(count);
        Ok(())
    }

    /// Appends `count` zero samples at the write cursor (gap padding, e.g.
    /// sensor startup silence).
    ///
    /// # Errors
    ///
    /// Returns [`TimeRingError::DataExceedsBufferSize`] if `count` exceeds
    /// the ring capacity.
    pub fn push_zeros(&mut self, count: usize) -> Result<(), TimeRingError> {
        if count > self.capacity_samples {
            return Err(TimeRingError::DataExceedsBufferSize {
                count,
                capacity: self.capacity_samples,
            });
        }

        let position = self.byte_position(self.write_cursor);
        self.ring.fill_zeros(position, count * self.frame_bytes);
        self.advance(count);
        Ok(())
    }

    fn advance(&mut self, count: usize) {
        self.write_cursor += count as i64;
        if !self.filled && self.write_cursor >= self.capacity_samples as i64 {
            self.filled = true;
            tracing::debug!(
                write_cursor = self.write_cursor,
                capacity = self.capacity_samples,
                "ring filled, subsequent pushes overwrite the oldest samples"
            );
        }
    }

    /// Reads the samples covering `[start_time, start_time + duration)` into
    /// `out`.
    ///
    /// The time range is converted to logical sample indices (half-up
    /// rounding on both edges, then the offset correction is subtracted).
    /// On success `out` is reshaped to the ring's sample shape, grown if
    /// needed (an explicit [`Stream::adjust`]), filled with a copy of the
    /// range, and stamped with the range's start time.
    ///
    /// # Errors
    ///
    /// In check order: [`TimeRingError::DurationTooSmall`] if the range
    /// resolves to zero samples, [`TimeRingError::DurationTooLarge`] if it
    /// resolves to more than the capacity, then the availability checks of
    /// [`TimeRing::read_by_index`].
    pub fn read_by_time(
        &mut self,
        start_time: f64,
        duration: f64,
        out: &mut Stream,
    ) -> Result<(), TimeRingError> {
        let start_sample = round_samples(start_time, self.sample_rate);
        let stop_sample = round_samples(start_time + duration, self.sample_rate);
        let count = stop_sample - start_sample;
        if count <= 0 {
            return Err(TimeRingError::DurationTooSmall);
        }

        #[allow(clippy::cast_sign_loss)] // count > 0 checked above
        let count = count as usize;
        self.read_by_index(out, count, start_sample - self.offset_samples)
    }

    /// Reads `count` samples starting at the absolute logical sample index
    /// `index` into `out`.
    ///
    /// Used when the caller already tracks sample indices; performs the same
    /// validation as [`TimeRing::read_by_time`] minus the time conversion.
    ///
    /// # Errors
    ///
    /// In check order:
    /// - [`TimeRingError::DurationTooSmall`] if `count` is zero.
    /// - [`TimeRingError::DurationTooLarge`] if `count` exceeds the capacity.
    /// - [`TimeRingError::DataNotInBufferAnymore`] if the range starts
    ///   before the eviction window.
    /// - [`TimeRingError::DataNotInBufferYet`] if the range ends past the
    ///   write cursor.
    pub fn read_by_index(
        &mut self,
        out: &mut Stream,
        count: usize,
        index: i64,
    ) -> Result<(), TimeRingError> {
        if count == 0 {
            return Err(TimeRingError::DurationTooSmall);
        }
        if count > self.capacity_samples {
            return Err(TimeRingError::DurationTooLarge {
                count,
                capacity: self.capacity_samples,
            });
        }
        if index + (self.capacity_samples as i64) < self.write_cursor {
            return Err(TimeRingError::DataNotInBufferAnymore {
                requested_start: index,
                oldest: self.write_cursor - self.capacity_samples as i64,
            });
        }
        if index + count as i64 > self.write_cursor {
            return Err(TimeRingError::DataNotInBufferYet {
                requested_end: index + count as i64,
                write_cursor: self.write_cursor,
            });
        }

        out.reshape(
            self.dimension,
            self.element_bytes,
            self.element_type,
            self.sample_rate,
        );
        out.adjust(count);
        out.set_time((self.offset_samples + index) as f64 * self.sample_duration);

        let position = self.byte_position(index);
        self.ring.copy_out(out.as_bytes_mut(), position);
        self.last_read_cursor = index + count as i64 - 1;
        Ok(())
    }

    /// Reinitializes the ring for a new session starting at `offset_time`.
    ///
    /// The write cursor and fill state are cleared; the offset correction is
    /// recomputed so the pipeline's global timeline continues.
    pub fn reset(&mut self, offset_time: f64) {
        self.offset_samples = round_samples(offset_time, self.sample_rate);
        self.write_cursor = 0;
        self.last_read_cursor = 0;
        self.filled = false;
        tracing::debug!(
            offset_samples = self.offset_samples,
            "ring reset"
        );
    }

    /// Relabels the ring's timeline so the next unwritten sample falls at
    /// `target_time`.
    ///
    /// This is a pure relabeling for clock drift: it changes which
    /// wall-clock time is attributed to already-written samples and to the
    /// next write, but moves no data and never touches the write cursor.
    pub fn resync(&mut self, target_time: f64) {
        let current = self.next_write_time();
        self.offset_samples -= round_samples(current - target_time, self.sample_rate);
        tracing::debug!(
            offset_samples = self.offset_samples,
            target_time,
            "ring resynced"
        );
    }

    /// Returns the current time offset in seconds.
    pub fn offset_time(&self) -> f64 {
        self.offset_samples as f64 * self.sample_duration
    }

    /// Returns the wall-clock time of the next unwritten sample.
    pub fn next_write_time(&self) -> f64 {
        (self.offset_samples + self.write_cursor) as f64 * self.sample_duration
    }

    /// Returns the logical index of the next unwritten sample.
    pub fn next_write_index(&self) -> i64 {
        self.write_cursor
    }

    /// Returns the wall-clock time of the last sample handed to a reader.
    pub fn last_read_time(&self) -> f64 {
        (self.offset_samples + self.last_read_cursor) as f64 * self.sample_duration
    }

    /// Returns the ring capacity in seconds.
    pub fn capacity_time(&self) -> f64 {
        self.capacity_samples as f64 * self.sample_duration
    }

    /// Returns the ring capacity in samples.
    pub fn capacity_samples(&self) -> usize {
        self.capacity_samples
    }

    /// Returns whether the ring has been written at least
    /// `capacity_samples` times since the last reset.
    pub fn filled(&self) -> bool {
        self.filled
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Returns the number of elements per sample.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the element type tag.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Returns the element size in bytes.
    pub fn element_bytes(&self) -> usize {
        self.element_bytes
    }

    /// Returns the byte stride of one sample.
    pub fn frame_bytes(&self) -> usize {
        self.frame_bytes
    }

    /// Returns the underlying byte ring.
    pub fn ring(&self) -> &ByteRing {
        &self.ring
    }

    /// Returns a mutable reference to the underlying byte ring.
    pub fn ring_mut(&mut self) -> &mut ByteRing {
        &mut self.ring
    }

    /// Creates an empty stream matching this ring's sample shape, suitable
    /// as a reusable read target.
    pub fn new_stream(&self) -> Stream {
        Stream::new(
            self.dimension,
            self.element_bytes,
            self.element_type,
            self.sample_rate,
        )
    }
}
