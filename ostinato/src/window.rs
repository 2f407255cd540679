//! Windowed framing engine.
//!
//! [`FrameWindower`] walks one finite input stream in fixed-size frames
//! plus optional right context ("delta"), presenting each window to a
//! [`Transform`] and assembling a correctly timestamped, correctly
//! dimensioned output stream. Windows are borrowed
//! [`StreamView`](crate::StreamView)s into the input — nothing is copied
//! and no bookkeeping on the input record is mutated.
//!
//! [`SampleWindower`] is the multi-channel variant: each channel of a
//! [`Sample`] can carry its own transformation and its own frame/delta
//! configuration (given in samples, or in time and resolved against that
//! channel's own rate the first time it is used); channels without a
//! transformation pass through unchanged.
//!
//! # Framing model
//!
//! With frame size `f`, delta `d`, and `L` input samples, the engine
//! produces exactly `(L - d) / f` windows of `f + d` samples each,
//! advancing by `f` per shift. Window `i` starts at time `i * f / rate`.
//! Any partial window at the tail is silently dropped; `flush` is a
//! separate, explicit call that lets the transformation emit trailing
//! internal state independent of the dropped tail.

use serde::{Deserialize, Serialize};

use crate::error::WindowError;
use crate::stream::{Sample, Stream};
use crate::transform::{StepInfo, Transform};

/// A window extent, in samples or in seconds.
///
/// Seconds are resolved against the stream's own sample rate at first use,
/// rounding half-up.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum WindowSize {
    /// Extent given directly in samples.
    Samples(usize),
    /// Extent given in seconds, resolved against the channel's rate.
    Seconds(f64),
}

impl WindowSize {
    /// Resolves the extent to a sample count against `sample_rate`.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)] // clamped non-negative
    pub fn resolve(self, sample_rate: f64) -> usize {
        match self {
            WindowSize::Samples(n) => n,
            WindowSize::Seconds(s) => (s * sample_rate + 0.5).floor().max(0.0) as usize,
        }
    }
}

impl Default for WindowSize {
    fn default() -> Self {
        WindowSize::Samples(0)
    }
}

/// Per-channel framing configuration.
///
/// A resolved frame size of zero selects whole-stream mode: the entire
/// input is treated as a single window.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FrameConfig {
    /// Core window size consumed per shift.
    pub frame: WindowSize,
    /// Right-context samples included in each window but not advanced past.
    #[serde(default)]
    pub delta: WindowSize,
}

impl FrameConfig {
    /// Whole-stream configuration: one window spanning the entire input.
    pub fn whole() -> Self {
        Self::default()
    }

    /// Configuration in samples.
    pub fn samples(frame: usize, delta: usize) -> Self {
        Self {
            frame: WindowSize::Samples(frame),
            delta: WindowSize::Samples(delta),
        }
    }

    /// Configuration in seconds, resolved against the channel rate at
    /// first use.
    pub fn seconds(frame: f64, delta: f64) -> Self {
        Self {
            frame: WindowSize::Seconds(frame),
            delta: WindowSize::Seconds(delta),
        }
    }
}

/// Drives a [`Transform`] across one input stream in fixed frames.
///
/// The windower owns no stream data; [`FrameWindower::run`] borrows the
/// input and returns the owned output by value.
#[derive(Debug)]
pub struct FrameWindower {
    config: FrameConfig,
    /// Frame/delta in samples, resolved against the first input's rate.
    resolved: Option<(usize, usize)>,
}

impl FrameWindower {
    /// Creates a windower with the given configuration.
    pub fn new(config: FrameConfig) -> Self {
        Self {
            config,
            resolved: None,
        }
    }

    /// Returns the configuration.
    pub fn config(&self) -> FrameConfig {
        self.config
    }

    /// Resolves the configuration to `(frame, delta)` sample counts against
    /// `sample_rate`, caching the result; later runs reuse the first
    /// resolution.
    pub fn resolve(&mut self, sample_rate: f64) -> (usize, usize) {
        *self.resolved.get_or_insert_with(|| {
            (
                self.config.frame.resolve(sample_rate),
                self.config.delta.resolve(sample_rate),
            )
        })
    }

    /// Processes the entire input stream, returning the output stream.
    ///
    /// `call_enter` and `call_flush` gate the lifecycle hooks so a caller
    /// that feeds successive chunks through the same transformation can
    /// invoke them once at setup/teardown instead of per chunk (see
    /// [`SampleWindower`]).
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::StreamTooShort`] if the input does not hold
    /// one full window, or [`WindowError::ShapeMismatch`] if the
    /// transformation's flush output does not match the output shape. Both
    /// are fatal configuration errors.
    pub fn run<T: Transform + ?Sized>(
        &mut self,
        transform: &mut T,
        input: &Stream,
        call_enter: bool,
        call_flush: bool,
    ) -> Result<Stream, WindowError> {
        let (frame, delta) = self.resolve(input.sample_rate());
        if frame == 0 {
            run_whole(transform, input, call_enter, call_flush)
        } else {
            run_sliding(transform, input, frame, delta, call_enter, call_flush)
        }
    }
}

/// Projects the output shape and creates an empty output stream for it.
fn projected_output<T: Transform + ?Sized>(
    transform: &T,
    input: &Stream,
    rate_out: f64,
) -> Stream {
    let mut out = Stream::new(
        transform.dimension_out(input.dimension()),
        transform.element_bytes_out(input.element_bytes()),
        transform.element_type_out(input.element_type()),
        rate_out,
    );
    out.set_time(input.time());
    out
}

/// Validates a flush tail against the output shape and appends it.
fn append_tail(out: &mut Stream, tail: &Stream) -> Result<(), WindowError> {
    if tail.dimension() != out.dimension()
        || tail.element_bytes() != out.element_bytes()
        || tail.element_type() != out.element_type()
    {
        return Err(WindowError::ShapeMismatch {
            expected_dim: out.dimension(),
            expected_bytes: out.element_bytes(),
            expected_type: out.element_type(),
            found_dim: tail.dimension(),
            found_bytes: tail.element_bytes(),
            found_type: tail.element_type(),
        });
    }
    out.append(tail);
    Ok(())
}

/// Whole-stream mode: the entire input is a single window.
fn run_whole<T: Transform + ?Sized>(
    transform: &mut T,
    input: &Stream,
    call_enter: bool,
    call_flush: bool,
) -> Result<Stream, WindowError> {
    let count_in = input.sample_count();
    let count_out = if count_in == 0 {
        0
    } else {
        transform.sample_count_out(count_in)
    };
    let rate_out = if count_in == 0 {
        0.0
    } else {
        (count_out as f64 / count_in as f64) * input.sample_rate()
    };

    let mut out = projected_output(transform, input, rate_out);
    if count_out == 0 {
        return Ok(out);
    }
    out.adjust(count_out);

    let in_view = input.view();
    if call_enter {
        let mut out_view = out.window_mut(0, count_out);
        transform.enter(&in_view, &mut out_view);
    }

    let info = StepInfo {
        frame_count: count_in,
        delta_count: 0,
        time: 0.0,
    };
    let mut out_view = out.window_mut(0, count_out);
    transform.step(&info, &in_view, &mut out_view);

    if call_flush {
        if let Some(tail_out) = transform.flush(&in_view) {
            append_tail(&mut out, &tail_out)?;
        }
    }
    Ok(out)
}

/// Sliding-window mode.
fn run_sliding<T: Transform + ?Sized>(
    transform: &mut T,
    input: &Stream,
    frame: usize,
    delta: usize,
    call_enter: bool,
    call_flush: bool,
) -> Result<Stream, WindowError> {
    let count_in = input.sample_count();
    let total = frame + delta;
    if count_in < total {
        return Err(WindowError::StreamTooShort {
            available: count_in,
            required: total,
        });
    }

    let max_shifts = (count_in - delta) / frame;
    let out_per_shift = transform.sample_count_out(frame);
    let rate_out = (out_per_shift as f64 / frame as f64) * input.sample_rate();

    let mut out = projected_output(transform, input, rate_out);
    out.adjust(max_shifts * out_per_shift);

    if call_enter {
        let in_view = input.window(0, total);
        let mut out_view = out.window_mut(0, out_per_shift);
        transform.enter(&in_view, &mut out_view);
    }

    for i in 0..max_shifts {
        let info = StepInfo {
            frame_count: frame,
            delta_count: delta,
            time: (i * frame) as f64 / input.sample_rate(),
        };
        let in_view = input.window(i * frame, total);
        let mut out_view = out.window_mut(i * out_per_shift, out_per_shift);
        transform.step(&info, &in_view, &mut out_view);
    }

    if call_flush {
        // Everything past the last full window; dropped from the output.
        let tail_offset = max_shifts * frame;
        let tail = input.window(tail_offset, count_in - tail_offset);
        if let Some(tail_out) = transform.flush(&tail) {
            append_tail(&mut out, &tail_out)?;
        }
    }
    Ok(out)
}

/// One configured channel of a [`SampleWindower`].
struct ChannelSlot {
    transform: Box<dyn Transform>,
    windower: FrameWindower,
}

impl std::fmt::Debug for ChannelSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelSlot")
            .field("windower", &self.windower)
            .finish_non_exhaustive()
    }
}

/// Applies an independent framing configuration per channel of a
/// multi-channel [`Sample`].
///
/// The shared scalar record ([`SampleInfo`](crate::SampleInfo)) is copied
/// verbatim to the output sample; only per-channel payloads differ.
/// `enter`/`flush` run once per configured channel at pipeline
/// setup/teardown, not per window.
#[derive(Debug)]
pub struct SampleWindower {
    channels: Vec<Option<ChannelSlot>>,
}

impl SampleWindower {
    /// Creates a windower for samples of `channel_count` channels, all
    /// initially pass-through.
    pub fn new(channel_count: usize) -> Self {
        Self {
            channels: (0..channel_count).map(|_| None).collect(),
        }
    }

    /// Returns the configured channel count.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Assigns a transformation and framing configuration to one channel,
    /// replacing any previous assignment.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::ChannelOutOfRange`] if `index` is past the
    /// configured channel count.
    pub fn set_transform(
        &mut self,
        index: usize,
        transform: Box<dyn Transform>,
        config: FrameConfig,
    ) -> Result<(), WindowError> {
        let channels = self.channels.len();
        let slot = self
            .channels
            .get_mut(index)
            .ok_or(WindowError::ChannelOutOfRange { index, channels })?;
        *slot = Some(ChannelSlot {
            transform,
            windower: FrameWindower::new(config),
        });
        Ok(())
    }

    fn check_channels(&self, sample: &Sample) -> Result<(), WindowError> {
        if sample.channels.len() != self.channels.len() {
            return Err(WindowError::ChannelCountMismatch {
                expected: self.channels.len(),
                found: sample.channels.len(),
            });
        }
        Ok(())
    }

    /// Calls `enter` once on every configured channel's transformation,
    /// using `sample` as the reference shape. Frame/delta configurations
    /// given in time are resolved here against each channel's own rate.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::ChannelCountMismatch`] if `sample` has the
    /// wrong channel count.
    pub fn enter(&mut self, sample: &Sample) -> Result<(), WindowError> {
        self.check_channels(sample)?;
        for (slot, channel) in self.channels.iter_mut().zip(&sample.channels) {
            let Some(slot) = slot else { continue };

            let (frame, delta) = slot.windower.resolve(channel.sample_rate());
            let window = if frame == 0 {
                channel.sample_count()
            } else {
                frame + delta
            };
            let count_out = if window == 0 {
                0
            } else {
                slot.transform.sample_count_out(window)
            };
            let rate_out = if window == 0 {
                0.0
            } else {
                (count_out as f64 / window as f64) * channel.sample_rate()
            };

            // Enter sees the channel's full stream and an empty output of
            // the projected shape; per-window output views come later.
            let mut scratch = projected_output(slot.transform.as_ref(), channel, rate_out);
            let in_view = channel.view();
            let mut out_view = scratch.window_mut(0, 0);
            slot.transform.enter(&in_view, &mut out_view);
        }
        Ok(())
    }

    /// Windows every configured channel of `sample`, passing unconfigured
    /// channels through unchanged. The scalar record is copied verbatim.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::ChannelCountMismatch`] on the wrong channel
    /// count, or any error from the per-channel [`FrameWindower::run`]
    /// (with enter/flush suppressed — those belong to
    /// [`SampleWindower::enter`]/[`SampleWindower::flush`]).
    pub fn apply(&mut self, sample: &Sample) -> Result<Sample, WindowError> {
        self.check_channels(sample)?;
        let mut channels = Vec::with_capacity(sample.channels.len());
        for (slot, channel) in self.channels.iter_mut().zip(&sample.channels) {
            match slot {
                None => channels.push(channel.clone()),
                Some(slot) => {
                    channels.push(slot.windower.run(
                        slot.transform.as_mut(),
                        channel,
                        false,
                        false,
                    )?);
                }
            }
        }
        Ok(Sample {
            info: sample.info,
            channels,
        })
    }

    /// Calls `flush` once on every configured channel's transformation at
    /// teardown. Trailing state has no output sample to land in and is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns [`WindowError::ChannelCountMismatch`] if `sample` has the
    /// wrong channel count.
    pub fn flush(&mut self, sample: &Sample) -> Result<(), WindowError> {
        self.check_channels(sample)?;
        for (slot, channel) in self.channels.iter_mut().zip(&sample.channels) {
            let Some(slot) = slot else { continue };
            let _ = slot.transform.flush(&channel.view());
        }
        Ok(())
    }
}
