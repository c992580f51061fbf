use criterion::{Criterion, black_box, criterion_group, criterion_main};
use pupil_track::detector::{DetectorConfig, Strategy};
use pupil_track::logging::LogCrateSink;
use pupil_track::tools::synthetic_eye;
use pupil_track::TargetRecognition;
use std::sync::Arc;

fn bench_strategies(c: &mut Criterion) {
    let frame = synthetic_eye(640, 480, 45.0);
    for strategy in Strategy::ALL {
        let processor = strategy.build(DetectorConfig::default(), Arc::new(LogCrateSink));
        c.bench_function(&format!("find_pupil_edges_{strategy}_640x480"), |b| {
            b.iter(|| processor.find_pupil_edges(black_box(&frame)))
        });
    }
}

fn bench_sweep_large(c: &mut Criterion) {
    let frame = synthetic_eye(1920, 1080, 120.0);
    let processor =
        Strategy::ThresholdSweep.build(DetectorConfig::default(), Arc::new(LogCrateSink));
    c.bench_function("find_pupil_edges_sweep_1920x1080", |b| {
        b.iter(|| processor.find_pupil_edges(black_box(&frame)))
    });
}

fn bench_full_pipeline(c: &mut Criterion) {
    let frame = synthetic_eye(640, 480, 45.0);
    let rec = TargetRecognition::with_strategy(
        Strategy::ThresholdSweep,
        DetectorConfig::default(),
        Arc::new(LogCrateSink),
    );
    c.bench_function("process_640x480", |b| b.iter(|| rec.process(black_box(&frame))));
}

criterion_group!(benches, bench_strategies, bench_sweep_large, bench_full_pipeline);
criterion_main!(benches);
