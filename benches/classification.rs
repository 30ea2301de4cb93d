//! Benchmarks for the per-frame gesture pipeline

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use gesture_control::config::Config;
use gesture_control::orchestrator::NullSink;
use gesture_control::tracking::HandBuilder;
use gesture_control::{classify, detect_extension, FrameOrchestrator, Gesture, TrackingFrame};

fn benchmark_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    for gesture in Gesture::ALL {
        let hand = HandBuilder::for_gesture(gesture).build();

        group.bench_with_input(BenchmarkId::new("detect_extension", gesture.name()), &hand, |b, hand| {
            b.iter(|| black_box(detect_extension(black_box(hand))));
        });

        group.bench_with_input(BenchmarkId::new("extension_and_classify", gesture.name()), &hand, |b, hand| {
            b.iter(|| {
                let ext = detect_extension(black_box(hand)).unwrap();
                black_box(classify(hand, &ext))
            });
        });
    }

    group.finish();
}

fn benchmark_frame_processing(c: &mut Criterion) {
    let mut group = c.benchmark_group("frame_processing");

    // A gesture sequence cycling through every output branch
    let frames: Vec<TrackingFrame> = (0..120)
        .map(|i| {
            let gesture = Gesture::ALL[i % Gesture::ALL.len()];
            let t = i as f64 / 30.0;
            let hand = HandBuilder::for_gesture(gesture)
                .offset(0.02 * t.sin(), 0.015 * t.cos())
                .build();
            TrackingFrame::with_hand(t, hand)
        })
        .collect();

    for smoothing in [false, true] {
        let mut config = Config::default();
        config.smoothing.enabled = smoothing;
        let label = if smoothing { "smoothed" } else { "raw" };

        group.bench_with_input(BenchmarkId::new("sequence_120", label), &frames, |b, frames| {
            b.iter(|| {
                let mut orchestrator = FrameOrchestrator::new(&config);
                for frame in frames {
                    let _ = black_box(orchestrator.process_and_dispatch(black_box(frame), &mut NullSink));
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, benchmark_classification, benchmark_frame_processing);
criterion_main!(benches);
