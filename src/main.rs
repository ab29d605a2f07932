use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use insectcrop::{
    CandidateOrder, Config, CropOutcome, CropSession, DisplayMapping, DragGesture, JsonDetector,
    LazyDetector, SegmentationPipeline, Strategy,
};

#[derive(Parser)]
#[command(name = "insectcrop")]
#[command(about = "Isolate a single insect in a photograph and crop it")]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// JSON configuration file (missing fields keep their defaults)
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Find the insect by thresholding, edges and contour fitting
    Segment {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Output file (default: <stem>_crop.png next to the input)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Save intermediate masks to directory (must be empty)
        #[arg(long, value_name = "DIR")]
        debug_out: Option<PathBuf>,

        /// Lower Canny threshold
        #[arg(long)]
        low: Option<u32>,

        /// Upper Canny threshold
        #[arg(long)]
        high: Option<u32>,

        /// Ceiling for the automatic threshold level
        #[arg(long)]
        ceiling: Option<u8>,
    },

    /// Crop a rectangle dragged on a scaled view of the image
    Manual {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// Size the image was displayed at, e.g. 800x600
        #[arg(long, value_parser = parse_size)]
        display: (u32, u32),

        /// Drag start in display coordinates, e.g. 10,20
        #[arg(long, value_parser = parse_point)]
        from: (f32, f32),

        /// Drag end in display coordinates
        #[arg(long, value_parser = parse_point)]
        to: (f32, f32),

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Crop the detection chosen from an external detector's output
    Detect {
        #[arg(value_name = "IMAGE")]
        image_path: PathBuf,

        /// JSON array of {x1, y1, x2, y2, confidence, class_id}
        #[arg(long, value_name = "FILE")]
        detections: PathBuf,

        /// Pick the most confident detection instead of the first one
        #[arg(long)]
        by_confidence: bool,

        #[arg(long)]
        min_confidence: Option<f32>,

        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
}

fn parse_size(s: &str) -> Result<(u32, u32), String> {
    let (w, h) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{s}'"))?;
    let w = w.trim().parse::<u32>().map_err(|e| format!("bad width '{w}': {e}"))?;
    let h = h.trim().parse::<u32>().map_err(|e| format!("bad height '{h}': {e}"))?;
    Ok((w, h))
}

fn parse_point(s: &str) -> Result<(f32, f32), String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y, got '{s}'"))?;
    let x = x.trim().parse::<f32>().map_err(|e| format!("bad x '{x}': {e}"))?;
    let y = y.trim().parse::<f32>().map_err(|e| format!("bad y '{y}': {e}"))?;
    Ok((x, y))
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("insectcrop={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_tracing(args.verbose);

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    };

    let mut session = CropSession::new();

    let (image_path, output, outcome) = match args.command {
        Command::Segment {
            image_path,
            output,
            debug_out,
            low,
            high,
            ceiling,
        } => {
            let seg = &mut config.segmentation;
            if let Some(low) = low {
                seg.edge_threshold_low = low;
            }
            if let Some(high) = high {
                seg.edge_threshold_high = high;
            }
            if let Some(ceiling) = ceiling {
                seg.threshold_ceiling = ceiling;
            }

            let mut pipeline = SegmentationPipeline::new(config.segmentation.clone())?;
            if let Some(dir) = debug_out {
                pipeline = pipeline.with_debug(dir)?;
            }

            session.load(&image_path)?;
            let outcome = session.crop(Strategy::Segmentation(&pipeline))?;
            (image_path, output, outcome)
        }

        Command::Manual {
            image_path,
            display,
            from,
            to,
            output,
        } => {
            session.load(&image_path)?;
            let original = session
                .image()
                .map(|img| img.dimensions())
                .ok_or_else(|| anyhow::anyhow!("image not loaded"))?;

            let mapping = DisplayMapping::new(original, display)?;
            let mut gesture = DragGesture::new();
            gesture.press(from, mapping);
            gesture.move_to(to);

            let outcome = match gesture.release(to) {
                Some(bbox) => session.crop(Strategy::Manual(bbox))?,
                None => {
                    println!("Selection is empty; nothing to crop.");
                    return Ok(());
                }
            };
            (image_path, output, outcome)
        }

        Command::Detect {
            image_path,
            detections,
            by_confidence,
            min_confidence,
            output,
        } => {
            if by_confidence {
                config.detector.order = CandidateOrder::ByConfidence;
            }
            if let Some(min) = min_confidence {
                config.detector.min_confidence = min;
            }

            let detector = LazyDetector::new("json", move || JsonDetector::from_file(&detections));

            session.load(&image_path)?;
            let outcome = session.crop(Strategy::Detector(&detector, &config.detector))?;
            (image_path, output, outcome)
        }
    };

    match outcome {
        CropOutcome::NotFound => {
            println!("No insect found in {}", image_path.display());
        }
        CropOutcome::Cropped(bbox) => {
            let output = output.unwrap_or_else(|| {
                session.default_crop_path(image_path.parent().unwrap_or(Path::new(".")))
            });
            session.save_crop(&output)?;
            println!(
                "Cropped {}x{} at ({}, {}) -> {}",
                bbox.width,
                bbox.height,
                bbox.x,
                bbox.y,
                output.display()
            );
        }
    }

    Ok(())
}
