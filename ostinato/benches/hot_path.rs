//! Microbenchmarks for the push and read hot paths.
//!
//! Measures push latency, timed-read latency against a reused output
//! stream, and the sliding-window framing loop.
//!
//! Run with: `cargo bench -p ostinato -- hot_path`

#![allow(missing_docs, clippy::cast_possible_truncation, clippy::cast_precision_loss)]

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use ostinato::{
    ElementType, FrameConfig, FrameWindower, StepInfo, Stream, StreamView, StreamViewMut,
    TimeRing, Transform,
};

/// Per-dimension mean, one output sample per window.
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
        let dim = input.dimension();
        let mut acc = vec![0.0f32; dim];
        for sample in input.to_f32_vec().unwrap().chunks_exact(dim) {
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

/// A 16 kHz mono f32 ring holding `seconds` of audio.
fn audio_ring(seconds: f64) -> TimeRing {
    TimeRing::new_by_duration(seconds, 16_000.0, 1, 4, ElementType::F32)
}

fn f32_chunk(count: usize) -> Vec<u8> {
    (0..count)
        .flat_map(|i| (i as f32).to_ne_bytes())
        .collect()
}

fn bench_push(c: &mut Criterion) {
    let mut group = c.benchmark_group("hot_path/push_samples");

    for count in [64, 256, 1024] {
        let mut ring = audio_ring(10.0);
        let chunk = f32_chunk(count);

        group.bench_with_input(BenchmarkId::from_parameter(count), &count, |b, _| {
            b.iter(|| {
                ring.push(black_box(&chunk), black_box(count)).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_read_by_time(c: &mut Criterion) {
    let mut ring = audio_ring(10.0);
    let chunk = f32_chunk(16_000);
    for _ in 0..10 {
        ring.push(&chunk, 16_000).unwrap();
    }

    // The output stream is reused, so steady state allocates nothing.
    let mut out = ring.new_stream();
    c.bench_function("hot_path/read_by_time_100ms", |b| {
        b.iter(|| {
            ring.read_by_time(black_box(1.0), black_box(0.1), &mut out)
                .unwrap();
        });
    });
}

fn bench_windowing(c: &mut Criterion) {
    let mut group = c.benchmark_group("hot_path/window_1s_frame_size");

    let values: Vec<f32> = (0..16_000).map(|i| i as f32).collect();
    let input = Stream::from_f32(1, 16_000.0, &values);

    for frame in [160, 512, 2048] {
        group.bench_with_input(BenchmarkId::from_parameter(frame), &frame, |b, &frame| {
            let mut windower = FrameWindower::new(FrameConfig::samples(frame, 0));
            b.iter(|| {
                let out = windower
                    .run(&mut Mean, black_box(&input), false, false)
                    .unwrap();
                black_box(out);
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_push, bench_read_by_time, bench_windowing);
criterion_main!(benches);
