use clap::{Parser, Subcommand};
use pupil_track::detector::{DetectorConfig, Strategy, SweepConfig, ThresholdSweepDetector};
use pupil_track::logging::{global_sink, init_logging};
use pupil_track::tools::{collect_images, frame_stats, load_frame, save_frame, synthetic_eye};
use pupil_track::worker::{EyeWorker, WorkerEvent};
use pupil_track::{TargetRecognition, unpack_circle};
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(name = "pupiltool", version, about = "Pupil localization CLI tools")]
struct Cli {
    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, default_value = "info", env = "PUPIL_LOG")]
    log_level: String,

    /// Read PUPIL_* tuning overrides from the environment
    #[arg(long, global = true)]
    env_config: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Locate the pupil in a single image
    Detect {
        #[arg(long)]
        image: PathBuf,
        #[arg(long, default_value_t = Strategy::ThresholdSweep)]
        strategy: Strategy,
    },
    /// Detect and write an annotated copy of an image
    Annotate {
        #[arg(long)]
        image: PathBuf,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = Strategy::ThresholdSweep)]
        strategy: Strategy,
        #[arg(long)]
        label: Option<String>,
    },
    /// Print luma statistics and the sweep diagnostics for an image
    Stats {
        #[arg(long)]
        image: PathBuf,
    },
    /// Write a synthetic eye image
    Synth {
        #[arg(long)]
        out: PathBuf,
        #[arg(long, default_value_t = 640)]
        width: usize,
        #[arg(long, default_value_t = 480)]
        height: usize,
        #[arg(long, default_value_t = 40.0)]
        radius: f32,
    },
    /// Annotate every image under a directory on the background worker
    Batch {
        #[arg(long)]
        dir: PathBuf,
        #[arg(long)]
        out_dir: PathBuf,
        #[arg(long, default_value_t = Strategy::ThresholdSweep)]
        strategy: Strategy,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let config = if cli.env_config {
        DetectorConfig::from_env()
    } else {
        DetectorConfig::default()
    };

    match cli.command {
        Command::Detect { image, strategy } => detect_cmd(&image, strategy, config),
        Command::Annotate {
            image,
            out,
            strategy,
            label,
        } => annotate_cmd(&image, &out, strategy, config, label),
        Command::Stats { image } => stats_cmd(&image, config.sweep),
        Command::Synth {
            out,
            width,
            height,
            radius,
        } => synth_cmd(&out, width, height, radius),
        Command::Batch {
            dir,
            out_dir,
            strategy,
        } => batch_cmd(&dir, &out_dir, strategy, config),
    }
}

fn detect_cmd(image: &Path, strategy: Strategy, config: DetectorConfig) {
    let frame = match load_frame(image) {
        Ok(frame) => frame,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    let processor = strategy.build(config, global_sink());
    let start = Instant::now();
    let edges = processor.find_pupil_edges(&frame);
    let elapsed = start.elapsed();

    println!(
        "Image: {} ({}x{}, {} channels)",
        image.display(),
        frame.width(),
        frame.height(),
        frame.channels()
    );
    match (strategy, unpack_circle(&edges)) {
        (Strategy::ContourTrace, _) if !edges.is_empty() => {
            println!("Traced {} boundary points", edges.len());
        }
        (_, Some((center, radius))) => {
            println!("Pupil: center=({}, {}) radius={}", center.x, center.y, radius);
        }
        _ => println!("No pupil found"),
    }
    println!("Time: {:.2} ms ({strategy})", elapsed.as_secs_f64() * 1000.0);
}

fn annotate_cmd(
    image: &Path,
    out: &Path,
    strategy: Strategy,
    config: DetectorConfig,
    label: Option<String>,
) {
    let frame = match load_frame(image) {
        Ok(frame) => frame,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    let mut recognition = TargetRecognition::with_strategy(strategy, config, global_sink());
    if let Some(label) = label {
        recognition = recognition.with_label(label);
    }
    let result = recognition.recognize(&frame);
    if let Err(err) = save_frame(&result.frame, out) {
        eprintln!("{err}");
        return;
    }
    println!(
        "Wrote {} ({} outline points)",
        out.display(),
        result.edges.len()
    );
}

fn stats_cmd(image: &Path, config: SweepConfig) {
    let frame = match load_frame(image) {
        Ok(frame) => frame,
        Err(err) => {
            eprintln!("{err}");
            return;
        }
    };

    let stats = frame_stats(&frame);
    println!("Image: {} ({}x{})", image.display(), frame.width(), frame.height());
    println!(
        "Grayscale range: {}-{}, average: {}",
        stats.min, stats.max, stats.avg
    );

    let detector = ThresholdSweepDetector::new(config, global_sink());
    match detector.locate(&frame) {
        Some(hit) => {
            let c = hit.original_circle();
            println!(
                "Accepted at threshold {}: working radius {:.1}, area {:.0}, circularity {:.3}, scale {:.3}",
                hit.threshold, hit.circle.radius, hit.area, hit.circularity, hit.scale
            );
            println!(
                "Pupil: center=({:.1}, {:.1}) radius={:.1}",
                c.center.x, c.center.y, c.radius
            );
        }
        None => println!("No threshold level produced a pupil"),
    }
}

fn synth_cmd(out: &Path, width: usize, height: usize, radius: f32) {
    let frame = synthetic_eye(width, height, radius);
    match save_frame(&frame, out) {
        Ok(()) => println!(
            "Wrote {} ({}x{}, pupil radius {:.1} at center)",
            out.display(),
            width,
            height,
            radius
        ),
        Err(err) => eprintln!("{err}"),
    }
}

fn batch_cmd(dir: &Path, out_dir: &Path, strategy: Strategy, config: DetectorConfig) {
    if let Err(err) = std::fs::create_dir_all(out_dir) {
        eprintln!("Failed to create {}: {}", out_dir.display(), err);
        return;
    }

    let images = collect_images(dir);
    println!("Processing {} images from {}", images.len(), dir.display());

    let worker = EyeWorker::spawn(TargetRecognition::with_strategy(
        strategy,
        config,
        global_sink(),
    ));
    for path in &images {
        worker.submit_path(path);
    }

    let start = Instant::now();
    let (mut written, mut failed) = (0usize, 0usize);
    for _ in 0..images.len() {
        let Some(event) = worker.recv() else {
            break;
        };
        match event {
            WorkerEvent::FrameProcessed { source, frame } => {
                let name = source
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_else(|| "frame".to_string());
                let target = out_dir.join(format!("{name}_annotated.png"));
                match save_frame(&frame, &target) {
                    Ok(()) => written += 1,
                    Err(err) => {
                        eprintln!("{err}");
                        failed += 1;
                    }
                }
            }
            WorkerEvent::Error { source, message } => {
                eprintln!("{}: {}", source.display(), message);
                failed += 1;
            }
        }
    }
    worker.shutdown();

    println!(
        "Done: {written} written, {failed} failed in {:.2}s",
        start.elapsed().as_secs_f64()
    );
}
