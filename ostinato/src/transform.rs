//! The transformation capability consumed by the framing engine.
//!
//! A [`Transform`] is anything that turns a window of input samples into a
//! window of output samples: a filter, a spectral feature, a classifier
//! front-end. The framing engine only needs the four shape projections (to
//! size the output stream once, up front) and the enter/step/flush
//! lifecycle. Concrete transformations live outside this crate.

use crate::stream::{ElementType, Stream, StreamView, StreamViewMut};

/// Per-window context handed to [`Transform::step`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepInfo {
    /// Samples the engine advances past after this step.
    pub frame_count: usize,
    /// Right-context samples included in the window but not advanced past.
    pub delta_count: usize,
    /// Start time of this window relative to the input stream, in seconds.
    pub time: f64,
}

/// A pluggable signal transformation with an enter/step/flush lifecycle.
///
/// The four shape projections must be pure: the engine calls them once per
/// run to derive the output stream's shape and rate, and sizes the whole
/// output buffer before the first step.
pub trait Transform {
    /// Output sample count for a window of `count_in` input samples.
    fn sample_count_out(&self, count_in: usize) -> usize;

    /// Output dimension for an input dimension.
    fn dimension_out(&self, dim_in: usize) -> usize;

    /// Output element byte width for an input byte width.
    fn element_bytes_out(&self, bytes_in: usize) -> usize;

    /// Output element type for an input element type.
    fn element_type_out(&self, ty_in: ElementType) -> ElementType;

    /// Called once before the first step, with the first window's input and
    /// output shapes. Use it to allocate internal state.
    fn enter(&mut self, input: &StreamView<'_>, output: &mut StreamViewMut<'_>) {
        let _ = (input, output);
    }

    /// Transforms one window of input into one window of output.
    fn step(&mut self, info: &StepInfo, input: &StreamView<'_>, output: &mut StreamViewMut<'_>);

    /// Called once after the last step. `tail` is the input remainder past
    /// the last full window (dropped from the output). A transformation may
    /// emit trailing internal state — a filter's residual, say — by
    /// returning a stream matching the output shape; the engine appends it.
    fn flush(&mut self, tail: &StreamView<'_>) -> Option<Stream> {
        let _ = tail;
        None
    }
}
