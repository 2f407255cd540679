//! # ostinato
//!
//! Streaming core for real-time multimodal signal pipelines.
//!
//! ostinato is a Rust library providing the storage and framing primitives a
//! live sensor pipeline is built from: fixed-capacity time-indexed ring
//! buffers that decouple producers from consumers, and a windowed framing
//! engine that slides pluggable transformations across finite streams with
//! exact, reproducible timing.
//!
//! **Status**: This crate is in early development. The API is not yet stable.
//!
//! ## Key Properties
//!
//! - Bounded, predictable storage — ring capacity is set by configuration,
//!   not data volume; overwrite of the oldest samples is the sole eviction
//! - Time-addressed reads with half-up rounding and a strict, ordered error
//!   taxonomy (too small, too large, overwritten, not yet produced)
//! - Drift resynchronization as a pure timeline relabeling — no data moves
//! - Borrowed window views into streams; the framing engine never mutates
//!   input bookkeeping and returns output by value
//! - One writer, many readers via a cloneable locked handle
//!
//! ## Quick Start
//!
//! ```rust
//! use ostinato::{ElementType, SharedTimeRing, TimeRing};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // A 2-second ring for a 1-dimensional f32 stream at 100 Hz.
//! let ring = SharedTimeRing::new(TimeRing::new_by_duration(
//!     2.0,
//!     100.0,
//!     1,
//!     4,
//!     ElementType::F32,
//! ));
//!
//! // Producer side: push raw sample bytes at the write cursor.
//! let chunk: Vec<u8> = (0..50).flat_map(|i| (i as f32).to_ne_bytes()).collect();
//! ring.push(&chunk, 50)?;
//!
//! // Consumer side: read a copy of [0.1s, 0.3s) into an owned stream.
//! let mut out = ring.new_stream();
//! ring.read_by_time(0.1, 0.2, &mut out)?;
//! assert_eq!(out.sample_count(), 20);
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`TimeRing`] — Time-indexed ring buffer; push, timed reads, resync
//! - [`SharedTimeRing`] — Cloneable one-writer/many-reader handle
//! - [`Stream`] / [`StreamView`] — Owned sample records and borrowed windows
//! - [`FrameWindower`] — Slides a [`Transform`] across a stream in frames
//! - [`SampleWindower`] — Per-channel framing for multi-channel samples
//!
//! ## Modules
//!
//! For lower-level access, the individual modules are also public:
//!
//! - [`ring`] — Raw circular byte store with wraparound addressing
//! - [`time_ring`] — Time and sample-index semantics over the byte store
//! - [`stream`] — Stream, view, and sample record types
//! - [`transform`] — The transformation trait and its lifecycle
//! - [`window`] — Framing engine and window configuration
//! - [`shared`] — Thread-safe shared ring handle
//! - [`error`] — Error types

pub mod error;
pub mod ring;
pub mod shared;
pub mod stream;
pub mod time_ring;
pub mod transform;
pub mod window;

// Re-export primary API types at crate root for convenience.
pub use error::{OstinatoError, Result, RingError, TimeRingError, WindowError};
pub use ring::ByteRing;
pub use shared::SharedTimeRing;
pub use stream::{ElementType, Sample, SampleInfo, Stream, StreamView, StreamViewMut};
pub use time_ring::{TimeRing, TimeRingConfig};
pub use transform::{StepInfo, Transform};
pub use window::{FrameConfig, FrameWindower, SampleWindower, WindowSize};
