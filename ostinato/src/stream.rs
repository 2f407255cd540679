//! Stream and sample records shared across the pipeline.
//!
//! A [`Stream`] is the plain data record carried between pipeline stages:
//! element type, byte width, dimension, sample rate, sample count, and a
//! contiguous sample-major byte payload. [`StreamView`] and
//! [`StreamViewMut`] are borrowed windows into a stream — an explicit
//! offset/count/stride type, so the framing engine never narrows a shared
//! record in place and never has to restore it on exit.
//!
//! A [`Sample`] groups several streams (one per channel) under a single
//! scalar record ([`SampleInfo`]) for the multi-channel windowing path.

use serde::{Deserialize, Serialize};

/// Tag describing the scalar element type of a stream payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementType {
    /// Unknown or opaque payload.
    Undefined,
    /// Signed 8-bit integer.
    I8,
    /// Unsigned 8-bit integer.
    U8,
    /// Signed 16-bit integer.
    I16,
    /// Unsigned 16-bit integer.
    U16,
    /// Signed 32-bit integer.
    I32,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned 64-bit integer.
    U64,
    /// 32-bit float.
    F32,
    /// 64-bit float.
    F64,
    /// Boolean flag (one byte).
    Bool,
}

impl ElementType {
    /// Returns the element size in bytes, or 0 for [`ElementType::Undefined`].
    pub fn size(self) -> usize {
        match self {
            ElementType::Undefined => 0,
            ElementType::I8 | ElementType::U8 | ElementType::Bool => 1,
            ElementType::I16 | ElementType::U16 => 2,
            ElementType::I32 | ElementType::U32 | ElementType::F32 => 4,
            ElementType::I64 | ElementType::U64 | ElementType::F64 => 8,
        }
    }
}

/// An owned stream record: shape metadata plus a contiguous sample-major
/// byte payload.
///
/// The payload always holds exactly `sample_count * dimension *
/// element_bytes` bytes. Growth is an explicit operation via
/// [`Stream::adjust`]; the backing allocation is retained when the count
/// shrinks, so reusing one stream across reads does not reallocate.
#[derive(Debug, Clone, PartialEq)]
pub struct Stream {
    element_type: ElementType,
    element_bytes: usize,
    dimension: usize,
    sample_rate: f64,
    sample_count: usize,
    /// Start time of the first sample, in seconds.
    time: f64,
    data: Vec<u8>,
}

impl Stream {
    /// Creates an empty stream with the given shape.
    ///
    /// # Arguments
    ///
    /// * `dimension` - Elements per sample
    /// * `element_bytes` - Bytes per element
    /// * `element_type` - Element type tag
    /// * `sample_rate` - Samples per second
    pub fn new(
        dimension: usize,
        element_bytes: usize,
        element_type: ElementType,
        sample_rate: f64,
    ) -> Self {
        Self {
            element_type,
            element_bytes,
            dimension,
            sample_rate,
            sample_count: 0,
            time: 0.0,
            data: Vec::new(),
        }
    }

    /// Creates an `f32` stream from a flat slice of values.
    ///
    /// `values.len()` must be a multiple of `dimension`; the sample count is
    /// derived from it.
    ///
    /// # Panics
    ///
    /// Panics if `values.len()` is not a multiple of `dimension`.
    pub fn from_f32(dimension: usize, sample_rate: f64, values: &[f32]) -> Self {
        assert!(dimension > 0 && values.len() % dimension == 0);
        let mut data = Vec::with_capacity(values.len() * 4);
        for v in values {
            data.extend_from_slice(&v.to_ne_bytes());
        }
        Self {
            element_type: ElementType::F32,
            element_bytes: 4,
            dimension,
            sample_rate,
            sample_count: values.len() / dimension,
            time: 0.0,
            data,
        }
    }

    /// Re-initializes the shape metadata in place, keeping the allocation.
    ///
    /// The sample count is reset to zero; call [`Stream::adjust`] afterwards.
    pub fn reshape(
        &mut self,
        dimension: usize,
        element_bytes: usize,
        element_type: ElementType,
        sample_rate: f64,
    ) {
        self.dimension = dimension;
        self.element_bytes = element_bytes;
        self.element_type = element_type;
        self.sample_rate = sample_rate;
        self.sample_count = 0;
        self.data.truncate(0);
    }

    /// Resizes the payload to hold exactly `sample_count` samples.
    ///
    /// New bytes are zero-filled. Shrinking keeps the allocation, so a
    /// stream reused as a read target grows at most once.
    pub fn adjust(&mut self, sample_count: usize) {
        let new_len = sample_count * self.frame_bytes();
        if new_len > self.data.len() {
            self.data.resize(new_len, 0);
        } else {
            self.data.truncate(new_len);
        }
        self.sample_count = sample_count;
    }

    /// Returns the element type tag.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Returns the element size in bytes.
    pub fn element_bytes(&self) -> usize {
        self.element_bytes
    }

    /// Returns the number of elements per sample.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Returns the number of samples in the payload.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Returns the start time of the first sample, in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Sets the start time of the first sample, in seconds.
    pub fn set_time(&mut self, time: f64) {
        self.time = time;
    }

    /// Returns the byte stride of one sample (`dimension * element_bytes`).
    pub fn frame_bytes(&self) -> usize {
        self.dimension * self.element_bytes
    }

    /// Returns the whole payload.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Returns the whole payload mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns a view over the whole stream.
    pub fn view(&self) -> StreamView<'_> {
        self.window(0, self.sample_count)
    }

    /// Returns a borrowed window of `count` samples starting at
    /// `offset` samples.
    ///
    /// # Panics
    ///
    /// Panics if `offset + count` exceeds the sample count.
    pub fn window(&self, offset: usize, count: usize) -> StreamView<'_> {
        let stride = self.frame_bytes();
        StreamView {
            data: &self.data[offset * stride..(offset + count) * stride],
            sample_count: count,
            dimension: self.dimension,
            element_bytes: self.element_bytes,
            element_type: self.element_type,
            sample_rate: self.sample_rate,
            time: if offset == 0 {
                self.time
            } else {
                self.time + offset as f64 / self.sample_rate
            },
        }
    }

    /// Returns a mutable borrowed window of `count` samples starting at
    /// `offset` samples.
    ///
    /// # Panics
    ///
    /// Panics if `offset + count` exceeds the sample count.
    pub fn window_mut(&mut self, offset: usize, count: usize) -> StreamViewMut<'_> {
        let stride = self.frame_bytes();
        StreamViewMut {
            data: &mut self.data[offset * stride..(offset + count) * stride],
            sample_count: count,
            dimension: self.dimension,
            element_bytes: self.element_bytes,
            element_type: self.element_type,
            sample_rate: self.sample_rate,
        }
    }

    /// Decodes the payload as native-endian `f32` values.
    ///
    /// Returns `None` if the element width is not 4 bytes.
    pub fn to_f32_vec(&self) -> Option<Vec<f32>> {
        if self.element_bytes != 4 {
            return None;
        }
        Some(
            self.data
                .chunks_exact(4)
                .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )
    }

    /// Appends the payload of `other` to this stream.
    ///
    /// The caller is responsible for shape compatibility; the framing
    /// engine validates it before calling.
    pub(crate) fn append(&mut self, other: &Stream) {
        self.data.extend_from_slice(other.as_bytes());
        self.sample_count += other.sample_count;
    }
}

/// A borrowed, read-only window of a stream.
///
/// Carries the full shape metadata of the region it exposes, so a
/// transformation sees a self-contained record without the engine mutating
/// the underlying stream's bookkeeping.
#[derive(Debug, Clone, Copy)]
pub struct StreamView<'a> {
    data: &'a [u8],
    sample_count: usize,
    dimension: usize,
    element_bytes: usize,
    element_type: ElementType,
    sample_rate: f64,
    time: f64,
}

impl<'a> StreamView<'a> {
    /// Returns the bytes of this window.
    pub fn as_bytes(&self) -> &'a [u8] {
        self.data
    }

    /// Returns the number of samples in this window.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Returns the number of elements per sample.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the element size in bytes.
    pub fn element_bytes(&self) -> usize {
        self.element_bytes
    }

    /// Returns the element type tag.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Returns the start time of this window, in seconds.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Returns the byte stride of one sample.
    pub fn frame_bytes(&self) -> usize {
        self.dimension * self.element_bytes
    }

    /// Decodes the window as native-endian `f32` values.
    ///
    /// Returns `None` if the element width is not 4 bytes.
    pub fn to_f32_vec(&self) -> Option<Vec<f32>> {
        if self.element_bytes != 4 {
            return None;
        }
        Some(
            self.data
                .chunks_exact(4)
                .map(|c| f32::from_ne_bytes([c[0], c[1], c[2], c[3]]))
                .collect(),
        )
    }
}

/// A borrowed, writable window of a stream.
#[derive(Debug)]
pub struct StreamViewMut<'a> {
    data: &'a mut [u8],
    sample_count: usize,
    dimension: usize,
    element_bytes: usize,
    element_type: ElementType,
    sample_rate: f64,
}

impl<'a> StreamViewMut<'a> {
    /// Returns the bytes of this window.
    pub fn as_bytes(&self) -> &[u8] {
        self.data
    }

    /// Returns the bytes of this window mutably.
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        self.data
    }

    /// Returns the number of samples in this window.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    /// Returns the number of elements per sample.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Returns the element size in bytes.
    pub fn element_bytes(&self) -> usize {
        self.element_bytes
    }

    /// Returns the element type tag.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Returns the sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.sample_rate
    }

    /// Returns the byte stride of one sample.
    pub fn frame_bytes(&self) -> usize {
        self.dimension * self.element_bytes
    }

    /// Encodes a slice of `f32` values into the window.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not exactly fill the window or the element
    /// width is not 4 bytes.
    pub fn copy_from_f32(&mut self, values: &[f32]) {
        assert_eq!(self.element_bytes, 4);
        assert_eq!(values.len() * 4, self.data.len());
        for (chunk, v) in self.data.chunks_exact_mut(4).zip(values) {
            chunk.copy_from_slice(&v.to_ne_bytes());
        }
    }
}

/// Scalar record shared by all channels of one multi-channel sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleInfo {
    /// Class label id.
    pub class_id: u32,
    /// User/session id.
    pub user_id: u32,
    /// Confidence score.
    pub score: f32,
    /// Sample time in seconds.
    pub time: f64,
}

/// A multi-channel sample: one stream per channel plus one shared scalar
/// record.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// The shared scalar record, copied verbatim through windowing.
    pub info: SampleInfo,
    /// Per-channel stream payloads.
    pub channels: Vec<Stream>,
}
