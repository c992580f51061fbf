use log::Level;
use pupil_track::detector::{
    ContourTraceDetector, DetectorConfig, HoughCircleDetector, SweepConfig, ThresholdSweepDetector,
    TraceConfig,
};
use pupil_track::logging::MemorySink;
use pupil_track::render::annotate_circle;
use pupil_track::tools::{synthetic_disk, synthetic_eye, with_bar, with_highlight};
use pupil_track::worker::{EyeWorker, WorkerEvent, process_batch};
use pupil_track::{EyeProcessor, Frame, Point, Strategy, TargetRecognition, unpack_circle};
use std::sync::Arc;
use std::time::Duration;

fn sweep(sink: Arc<MemorySink>) -> ThresholdSweepDetector {
    ThresholdSweepDetector::new(SweepConfig::default(), sink)
}

fn all_strategies() -> Vec<Arc<dyn EyeProcessor>> {
    Strategy::ALL
        .iter()
        .map(|s| s.build(DetectorConfig::default(), Arc::new(MemorySink::new())))
        .collect()
}

fn to_rgb(frame: &Frame) -> Frame {
    let data = frame.as_bytes().iter().flat_map(|&v| [v, v, v]).collect();
    Frame::new(frame.width(), frame.height(), 3, data)
}

fn assert_circle(edges: &[Point], cx: i32, cy: i32, r: i32, tol: i32) {
    let (center, radius) = unpack_circle(edges).expect("expected a packed circle");
    assert!(
        (center.x - cx).abs() <= tol && (center.y - cy).abs() <= tol,
        "center {:?}, expected ({}, {})",
        center,
        cx,
        cy
    );
    assert!((radius - r).abs() <= tol, "radius {}, expected {}", radius, r);
}

#[test]
fn process_preserves_dimensions() {
    let frames = [
        synthetic_disk(320, 240, 100.0, 120.0, 30.0, 20, 210),
        to_rgb(&synthetic_disk(200, 300, 100.0, 150.0, 25.0, 20, 210)),
        Frame::filled(64, 48, 4, 128),
        Frame::filled(1, 1, 1, 0),
        Frame::filled(1, 1, 3, 255),
        Frame::filled(2, 7, 4, 10),
    ];
    for processor in all_strategies() {
        let rec = TargetRecognition::new(processor);
        for frame in &frames {
            let out = rec.process(frame);
            assert_eq!((out.width(), out.height()), (frame.width(), frame.height()));
            assert!(out.is_valid());
        }
    }
}

#[test]
fn oversized_dimensions_pass_through() {
    let frame = Frame::new(usize::MAX, 2, 1, vec![1]);
    for processor in all_strategies() {
        assert!(processor.find_pupil_edges(&frame).is_empty());
        assert_eq!(processor.find_eye_center(&frame), None);
        assert_eq!(TargetRecognition::new(processor).process(&frame), frame);
    }
}

#[test]
fn default_recognition_reports_center() {
    let frame = synthetic_disk(320, 240, 140.0, 100.0, 30.0, 20, 210);
    let result = TargetRecognition::default().recognize(&frame);
    let center = result.center.expect("sweep center");
    assert!((center.x - 140).abs() <= 2 && (center.y - 100).abs() <= 2);
    assert_eq!(result.edges[0], center);
}

#[test]
fn single_disk_is_found_within_two_pixels() {
    let sink = Arc::new(MemorySink::new());
    let d = sweep(sink);

    let gray = synthetic_disk(480, 360, 210.0, 170.0, 45.0, 15, 220);
    assert_circle(&d.find_pupil_edges(&gray), 210, 170, 45, 2);
    assert_circle(&d.find_pupil_edges(&to_rgb(&gray)), 210, 170, 45, 2);
}

#[test]
fn transparent_background_is_not_dark() {
    // Fully transparent black everywhere except an opaque dark disk
    let (w, h) = (300usize, 300usize);
    let mut data = vec![0u8; w * h * 4];
    for y in 0..h {
        for x in 0..w {
            let dx = x as f32 - 150.0;
            let dy = y as f32 - 140.0;
            if dx * dx + dy * dy <= 40.0 * 40.0 {
                data[(y * w + x) * 4..(y * w + x) * 4 + 4].copy_from_slice(&[20, 20, 20, 255]);
            }
        }
    }
    let frame = Frame::new(w, h, 4, data);
    let edges = sweep(Arc::new(MemorySink::new())).find_pupil_edges(&frame);
    assert_circle(&edges, 150, 140, 40, 2);
}

#[test]
fn blank_frame_yields_nothing_and_only_watermark_changes() {
    let frame = Frame::filled(240, 200, 3, 235);
    for processor in all_strategies() {
        assert!(processor.find_pupil_edges(&frame).is_empty());
        let out = TargetRecognition::new(processor).process(&frame);
        assert_eq!(out.channels(), 3);
        for y in 0..frame.height() {
            for x in 0..frame.width() {
                let in_watermark = (22..50).contains(&y) && x >= 50;
                if !in_watermark {
                    assert_eq!(out.pixel(x, y), frame.pixel(x, y), "pixel ({x}, {y}) changed");
                }
            }
        }
    }
}

#[test]
fn annotate_with_no_edges_is_identity() {
    let frames = [
        Frame::filled(50, 40, 1, 9),
        to_rgb(&synthetic_disk(80, 80, 40.0, 40.0, 10.0, 0, 200)),
        Frame::filled(30, 30, 4, 77),
    ];
    for processor in all_strategies() {
        for frame in &frames {
            assert_eq!(&processor.draw_edges_and_watermark(frame, &[], "LABEL"), frame);
        }
    }
    assert_eq!(annotate_circle(&frames[0], &[], "LABEL"), frames[0]);
}

#[test]
fn downscale_round_trip_matches_working_resolution() {
    let d = sweep(Arc::new(MemorySink::new()));

    let small = synthetic_disk(600, 600, 300.0, 300.0, 120.0, 20, 220);
    let (c_small, r_small) = unpack_circle(&d.find_pupil_edges(&small)).unwrap();

    let large = synthetic_disk(2000, 2000, 1000.0, 1000.0, 400.0, 20, 220);
    let hit = d.locate(&large).unwrap();
    assert!((hit.scale - 2000.0 / 600.0).abs() < 1e-4);
    let (c_large, r_large) = unpack_circle(&d.find_pupil_edges(&large)).unwrap();

    let s = hit.scale;
    let back = |v: i32| (v as f32 / s).round() as i32;
    assert!((back(r_large) - r_small).abs() <= 2, "{} vs {}", r_large, r_small);
    assert!((back(c_large.x) - c_small.x).abs() <= 2);
    assert!((back(c_large.y) - c_small.y).abs() <= 2);
    // Working-resolution error of about 2px grows by the scale factor
    assert!((r_large - 400).abs() as f32 <= 3.0 * s, "radius {}", r_large);
}

#[test]
fn moderate_downscale_stays_close() {
    let d = sweep(Arc::new(MemorySink::new()));
    let frame = to_rgb(&synthetic_disk(1200, 900, 500.0, 420.0, 110.0, 25, 215));
    let hit = d.locate(&frame).unwrap();
    assert_eq!(hit.scale, 2.0);
    assert_circle(&d.find_pupil_edges(&frame), 500, 420, 110, 6);
}

#[test]
fn sweep_accepts_exactly_at_first_round_level() {
    let sink = Arc::new(MemorySink::new());
    // A thin bar darker than the disk becomes foreground first but is never round
    let frame = synthetic_disk(600, 600, 200.0, 300.0, 60.0, 100, 220);
    let frame = with_bar(&frame, 450, 100, 456, 500, 50);

    let hit = sweep(sink.clone()).locate(&frame).unwrap();
    assert_eq!(hit.threshold, 100);
    let accepted: Vec<String> = sink
        .messages_at(Level::Info)
        .into_iter()
        .filter(|m| m.contains("accepted"))
        .collect();
    assert_eq!(accepted.len(), 1);
    assert!(accepted[0].contains("threshold 100"));
}

#[test]
fn highlight_inside_pupil_is_ignored() {
    let frame = synthetic_disk(500, 400, 260.0, 190.0, 50.0, 30, 210);
    let frame = with_highlight(&frame, 245.0, 175.0, 6.0, 255);
    let edges = sweep(Arc::new(MemorySink::new())).find_pupil_edges(&frame);
    assert_circle(&edges, 260, 190, 50, 2);
}

#[test]
fn eye_image_prefers_pupil_over_iris() {
    let frame = synthetic_eye(600, 450, 40.0);
    let edges = sweep(Arc::new(MemorySink::new())).find_pupil_edges(&frame);
    assert_circle(&edges, 300, 225, 40, 2);
}

#[test]
fn hough_strategy_recenters_before_measuring() {
    let hough = Arc::new(HoughCircleDetector::new(
        Default::default(),
        Arc::new(MemorySink::new()),
    ));
    let frame = synthetic_disk(300, 200, 90.0, 80.0, 30.0, 20, 210);
    let result = TargetRecognition::new(hough).recognize(&frame);

    let center = result.center.unwrap();
    assert!((center.x - 90).abs() <= 2 && (center.y - 80).abs() <= 2);
    // After recentering the pupil sits at the frame center
    assert_circle(&result.edges, 150, 100, 30, 2);
    assert_eq!(result.frame.channels(), 3);
}

#[test]
fn trace_strategy_returns_dense_boundary() {
    let trace = ContourTraceDetector::new(TraceConfig::default(), Arc::new(MemorySink::new()));
    let frame = synthetic_disk(200, 160, 100.0, 80.0, 20.0, 10, 200);
    let edges = trace.find_pupil_edges(&frame);
    assert!(edges.len() > 2);
    assert!(unpack_circle(&edges).is_none());

    let out = trace.draw_edges_and_watermark(&frame, &edges, "TRACE");
    assert_ne!(out, to_rgb(&frame));
}

#[test]
fn strategies_agree_on_a_clean_disk() {
    let frame = synthetic_disk(400, 300, 180.0, 150.0, 35.0, 20, 210);
    let sweep_edges = sweep(Arc::new(MemorySink::new())).find_pupil_edges(&frame);
    let hough_edges =
        HoughCircleDetector::new(Default::default(), Arc::new(MemorySink::new())).find_pupil_edges(&frame);
    let (a, ra) = unpack_circle(&sweep_edges).unwrap();
    let (b, rb) = unpack_circle(&hough_edges).unwrap();
    assert!((a.x - b.x).abs() <= 3 && (a.y - b.y).abs() <= 3);
    assert!((ra - rb).abs() <= 3);
}

#[test]
fn worker_and_batch_process_independent_frames() {
    let rec = TargetRecognition::default();
    let frames: Vec<Frame> = (0..4)
        .map(|i| synthetic_disk(160, 120, 60.0 + 10.0 * i as f32, 60.0, 18.0, 20, 210))
        .collect();

    let batch = process_batch(&rec, &frames);
    assert_eq!(batch.len(), frames.len());

    let worker = EyeWorker::spawn(rec);
    for (i, f) in frames.iter().enumerate() {
        assert!(worker.submit_frame(format!("frame{i}"), f.clone()));
    }
    for (i, expected) in batch.iter().enumerate() {
        match worker.recv_timeout(Duration::from_secs(30)).unwrap() {
            WorkerEvent::FrameProcessed { source, frame } => {
                assert_eq!(source.to_string_lossy(), format!("frame{i}"));
                assert_eq!(&frame, expected);
            }
            other => panic!("unexpected {other:?}"),
        }
    }
    assert!(worker.shutdown().is_empty());
}
