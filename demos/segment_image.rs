use std::env;

use insectcrop::segmentation::steps::*;
use insectcrop::{Pipeline, SegmentationConfig, SegmentationPipeline, ThresholdPolarity};

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <image_path> [debug_dir]", args[0]);
        std::process::exit(1);
    }

    let img = insectcrop::imageio::load_image(&args[1])?;
    println!("Loaded image: {}x{}", img.width(), img.height());

    // Example 1: Default segmentation
    println!("\n=== Default Segmentation ===");
    let mut segmenter = SegmentationPipeline::new(SegmentationConfig::default())?;
    if let Some(dir) = args.get(2) {
        segmenter = segmenter.with_debug(dir)?;
        println!("Saving intermediate masks to {}", dir);
    }
    match segmenter.fit_rect(&img)? {
        Some(rect) => {
            println!(
                "Rotated rect: center=({:.1}, {:.1}) size={:.1}x{:.1} angle={:.1}",
                rect.center.0, rect.center.1, rect.size.0, rect.size.1, rect.angle
            );
            let bbox = rect.bounding_box().clamp_to(img.width(), img.height());
            let crop = insectcrop::extract(&img, &bbox)?;
            crop.save("segment_crop.png")?;
            println!("Crop {} saved to segment_crop.png", bbox);
        }
        None => println!("No region found"),
    }

    // Example 2: Wider closing for fragmented outlines
    println!("\n=== Wider Closing ===");
    let wide = SegmentationConfig {
        morph_kernel_size: 5,
        dilate_iterations: 3,
        ..SegmentationConfig::default()
    };
    match insectcrop::segment(&img, &wide)? {
        Some(bbox) => println!("Region: {}", bbox),
        None => println!("No region found"),
    }

    // Example 3: Hand-built pipeline, stopped after thresholding
    println!("\n=== Partial Pipeline (Threshold Only) ===");
    let pipeline = Pipeline::new()
        .add_step_boxed(Box::new(ThresholdStep {
            ceiling: 200,
            polarity: ThresholdPolarity::DarkForeground,
        }))
        .add_step_boxed(Box::new(EdgeDetectionStep {
            low_threshold: 100.0,
            high_threshold: 200.0,
        }))
        .add_step_boxed(Box::new(ClosingStep {
            radius: 1,
            dilate_iterations: 2,
            erode_iterations: 1,
        }));
    println!("Steps: {:?}", pipeline.step_names());

    let mask = pipeline.run_partial(&img, 1)?;
    let foreground = mask.pixels().filter(|p| p[0] > 0).count();
    println!(
        "Foreground after threshold: {} of {} pixels",
        foreground,
        mask.width() * mask.height()
    );

    Ok(())
}
