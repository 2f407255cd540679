//! Shared handle for one producer and many readers.
//!
//! [`TimeRing`] itself is not internally synchronized; its contract is at
//! most one writer and no concurrent reader during a write. [`SharedTimeRing`]
//! makes that contract a type: a cloneable handle over `Arc<Mutex<TimeRing>>`
//! where every operation is one critical section, so a push and a read can
//! never observe each other half-done.
//!
//! Reads copy into a caller-owned [`Stream`] while the lock is held; the
//! result is fully owned, so readers never hold the lock while processing.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::error::TimeRingError;
use crate::stream::Stream;
use crate::time_ring::TimeRing;

/// A cloneable, thread-safe handle to one [`TimeRing`].
///
/// Each method takes the lock for the duration of that single operation. A
/// poisoned lock is recovered rather than propagated: the ring holds plain
/// bytes and cursors and stays structurally valid even if a holder panicked
/// mid-operation.
#[derive(Debug, Clone)]
pub struct SharedTimeRing {
    inner: Arc<Mutex<TimeRing>>,
}

impl SharedTimeRing {
    /// Wraps a ring in a shared handle.
    pub fn new(ring: TimeRing) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ring)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TimeRing> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Appends `count` samples at the write cursor.
    ///
    /// # Errors
    ///
    /// See [`TimeRing::push`].
    pub fn push(&self, samples: &[u8], count: usize) -> Result<(), TimeRingError> {
        self.lock().push(samples, count)
    }

    /// Appends `count` zero samples at the write cursor.
    ///
    /// # Errors
    ///
    /// See [`TimeRing::push_zeros`].
    pub fn push_zeros(&self, count: usize) -> Result<(), TimeRingError> {
        self.lock().push_zeros(count)
    }

    /// Reads the samples covering `[start_time, start_time + duration)` into
    /// `out`.
    ///
    /// # Errors
    ///
    /// See [`TimeRing::read_by_time`]. [`TimeRingError::DataNotInBufferYet`]
    /// is the reader's pacing signal: back off and retry once the producer
    /// has caught up.
    pub fn read_by_time(
        &self,
        start_time: f64,
        duration: f64,
        out: &mut Stream,
    ) -> Result<(), TimeRingError> {
        self.lock().read_by_time(start_time, duration, out)
    }

    /// Reads `count` samples starting at the absolute logical sample index
    /// `index` into `out`.
    ///
    /// # Errors
    ///
    /// See [`TimeRing::read_by_index`].
    pub fn read_by_index(
        &self,
        out: &mut Stream,
        count: usize,
        index: i64,
    ) -> Result<(), TimeRingError> {
        self.lock().read_by_index(out, count, index)
    }

    /// Reinitializes the ring for a new session starting at `offset_time`.
    pub fn reset(&self, offset_time: f64) {
        self.lock().reset(offset_time);
    }

    /// Relabels the ring's timeline so the next unwritten sample falls at
    /// `target_time`.
    pub fn resync(&self, target_time: f64) {
        self.lock().resync(target_time);
    }

    /// Returns the wall-clock time of the next unwritten sample.
    pub fn next_write_time(&self) -> f64 {
        self.lock().next_write_time()
    }

    /// Returns the logical index of the next unwritten sample.
    pub fn next_write_index(&self) -> i64 {
        self.lock().next_write_index()
    }

    /// Returns the ring capacity in seconds.
    pub fn capacity_time(&self) -> f64 {
        self.lock().capacity_time()
    }

    /// Creates an empty stream matching the ring's sample shape.
    pub fn new_stream(&self) -> Stream {
        self.lock().new_stream()
    }

    /// Runs `f` with the locked ring, for compound operations that must be
    /// one critical section (e.g. a read followed by a resync decision).
    pub fn with<R>(&self, f: impl FnOnce(&mut TimeRing) -> R) -> R {
        f(&mut self.lock())
    }
}
