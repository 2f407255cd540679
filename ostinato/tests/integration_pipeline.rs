//! Integration tests for the full producer -> ring -> windowing pipeline.
//!
//! These tests verify that a threaded producer and consumer coordinate
//! through a [`SharedTimeRing`] using the error taxonomy as a pacing signal,
//! that timed reads feed the framing engine with exact timestamps, and that
//! drift resynchronization relabels a live pipeline without corrupting data.

use ostinato::{
    ElementType, FrameConfig, FrameWindower, Sample, SampleInfo, SampleWindower, SharedTimeRing,
    StepInfo, Stream, StreamView, StreamViewMut, TimeRing, TimeRingError, Transform,
};

/// Per-dimension mean over each window, one output sample per window.
struct Mean;

impl Transform for Mean {
    fn sample_count_out(&self, _count_in: usize) -> usize {
        1
    }
    fn dimension_out(&self, dim_in: usize) -> usize {
        dim_in
    }
    fn element_bytes_out(&self, bytes_in: usize) -> usize {
        bytes_in
    }
    fn element_type_out(&self, ty_in: ElementType) -> ElementType {
        ty_in
    }
    fn step(&mut self, _info: &StepInfo, input: &StreamView<'_>, output: &mut StreamViewMut<'_>) {
        let values = input.to_f32_vec().unwrap();
        let dim = input.dimension();
        let mut acc = vec![0.0f32; dim];
        for sample in values.chunks_exact(dim) {
            for (a, v) in acc.iter_mut().zip(sample) {
                *a += v;
            }
        }
        let n = input.sample_count() as f32;
        for a in &mut acc {
            *a /= n;
        }
        output.copy_from_f32(&acc);
    }
}

fn f32_bytes(values: &[f32]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_ne_bytes()).collect()
}

/// Reads `[start, start + duration)` from the ring, retrying while the
/// producer has not caught up yet.
fn read_when_available(ring: &SharedTimeRing, start: f64, duration: f64, out: &mut Stream) {
    loop {
        match ring.read_by_time(start, duration, out) {
            Ok(()) => return,
            Err(TimeRingError::DataNotInBufferYet { .. }) => std::thread::yield_now(),
            Err(e) => panic!("unexpected read error: {e}"),
        }
    }
}

/// A threaded producer pushes a ramp in small chunks; a consumer paces
/// itself on `DataNotInBufferYet`, reads fixed slices by time, and windows
/// each slice through a mean transform.
#[test]
fn test_threaded_producer_to_windowed_consumer() {
    // 100 Hz, 1-dimensional f32, 2-second ring.
    let ring = SharedTimeRing::new(TimeRing::new_by_duration(
        2.0,
        100.0,
        1,
        4,
        ElementType::F32,
    ));
    let producer_ring = ring.clone();

    // 200 samples in chunks of 10: values 0..200.
    let producer = std::thread::spawn(move || {
        for chunk in 0..20 {
            let values: Vec<f32> = (0..10).map(|i| (chunk * 10 + i) as f32).collect();
            producer_ring.push(&f32_bytes(&values), 10).unwrap();
        }
    });

    // Consume 0.5-second slices and reduce each to 10 means of 5 samples.
    let mut windower = FrameWindower::new(FrameConfig::samples(5, 0));
    let mut slice = ring.new_stream();
    let mut means = Vec::new();
    for i in 0..4 {
        let start = i as f64 * 0.5;
        read_when_available(&ring, start, 0.5, &mut slice);
        assert_eq!(slice.sample_count(), 50);
        assert!((slice.time() - start).abs() < 1e-9);

        let out = windower.run(&mut Mean, &slice, false, false).unwrap();
        assert!((out.sample_rate() - 20.0).abs() < 1e-9);
        means.extend(out.to_f32_vec().unwrap());
    }
    producer.join().unwrap();

    // Mean of samples 5i..5i+5 of a unit ramp is 5i + 2.
    let expected: Vec<f32> = (0..40).map(|i| (5 * i + 2) as f32).collect();
    assert_eq!(means, expected);
}

/// Resyncing mid-stream relabels subsequent timed reads without moving or
/// corrupting resident samples.
#[test]
fn test_resync_relabels_live_pipeline() {
    let ring = SharedTimeRing::new(TimeRing::new_by_samples(100, 10.0, 1, 1, ElementType::U8));

    let first: Vec<u8> = (0..40).collect();
    ring.push(&first, 40).unwrap();

    // The producer's clock says the next sample lands at 5.0 s, not 4.0 s.
    ring.resync(5.0);
    assert!((ring.next_write_time() - 5.0).abs() < 1e-9);

    let second: Vec<u8> = (40..60).collect();
    ring.push(&second, 20).unwrap();

    // Old data is addressed on the shifted timeline: sample 39 now ends at 5.0 s.
    let mut out = ring.new_stream();
    ring.read_by_time(4.0, 1.0, &mut out).unwrap();
    assert_eq!(out.as_bytes(), &(30..40).collect::<Vec<u8>>()[..]);

    // New data continues seamlessly from the relabeled cursor.
    ring.read_by_time(5.0, 2.0, &mut out).unwrap();
    assert_eq!(out.as_bytes(), &(40..60).collect::<Vec<u8>>()[..]);
}

/// A slow consumer that falls more than one ring-capacity behind gets
/// `DataNotInBufferAnymore` and can reposition at the oldest resident sample.
#[test]
fn test_slow_consumer_repositions_after_eviction() {
    let ring = SharedTimeRing::new(TimeRing::new_by_samples(8, 1.0, 1, 1, ElementType::U8));

    for chunk in 0..4u8 {
        let data: Vec<u8> = (chunk * 8..chunk * 8 + 8).collect();
        ring.push(&data, 8).unwrap();
    }
    // 32 samples pushed; only 24..32 remain resident.
    let mut out = ring.new_stream();
    let oldest = match ring.read_by_index(&mut out, 4, 0) {
        Err(TimeRingError::DataNotInBufferAnymore { oldest, .. }) => oldest,
        other => panic!("expected eviction error, got {other:?}"),
    };
    assert_eq!(oldest, 24);

    ring.read_by_index(&mut out, 4, oldest).unwrap();
    assert_eq!(out.as_bytes(), &[24, 25, 26, 27]);
}

/// Multi-channel samples flow through per-channel framing: audio and
/// physiological channels at different rates get the same time-based
/// configuration, resolved against each channel's own rate.
#[test]
fn test_multichannel_sample_pipeline() {
    let audio: Vec<f32> = (0..64).map(|i| i as f32).collect();
    let physio: Vec<f32> = (0..16).map(|i| i as f32 * 10.0).collect();
    let mut audio_stream = Stream::from_f32(1, 32.0, &audio);
    let mut physio_stream = Stream::from_f32(1, 8.0, &physio);
    audio_stream.set_time(0.0);
    physio_stream.set_time(0.0);

    let sample = Sample {
        info: SampleInfo {
            class_id: 1,
            user_id: 42,
            score: 0.9,
            time: 0.0,
        },
        channels: vec![audio_stream, physio_stream],
    };

    let mut windower = SampleWindower::new(2);
    // One second per window on both channels: 32 samples vs 8 samples.
    windower
        .set_transform(0, Box::new(Mean), FrameConfig::seconds(1.0, 0.0))
        .unwrap();
    windower
        .set_transform(1, Box::new(Mean), FrameConfig::seconds(1.0, 0.0))
        .unwrap();

    windower.enter(&sample).unwrap();
    let out = windower.apply(&sample).unwrap();
    windower.flush(&sample).unwrap();

    assert_eq!(out.info, sample.info);
    assert_eq!(out.channels[0].sample_count(), 2);
    assert_eq!(out.channels[1].sample_count(), 2);
    // Mean of 0..32 is 15.5; of 32..64 is 47.5. Physio values are scaled by 10.
    assert_eq!(out.channels[0].to_f32_vec().unwrap(), vec![15.5, 47.5]);
    assert_eq!(out.channels[1].to_f32_vec().unwrap(), vec![35.0, 115.0]);
}
