//! Tests for the individual mask stages and the composable pipeline.

mod common;

use std::sync::Arc;

use common::*;
use image::{GrayImage, Luma};
use insectcrop::pipeline::{Pipeline, PipelineContext, PipelineStep};
use insectcrop::segmentation::preprocessing::{
    binarize, close_gaps, detect_edges, threshold_level,
};
use insectcrop::segmentation::steps::{EdgeDetectionStep, ThresholdStep};

fn square_on(background: u8, foreground: u8) -> GrayImage {
    GrayImage::from_fn(20, 20, |x, y| {
        if (5..10).contains(&x) && (5..10).contains(&y) {
            Luma([foreground])
        } else {
            Luma([background])
        }
    })
}

#[test]
fn test_auto_polarity_marks_minority_class() {
    let dark_on_light = square_on(250, 10);
    let level = threshold_level(&dark_on_light, 200);
    let mask = binarize(&dark_on_light, level, ThresholdPolarity::Auto);
    assert_eq!(mask.get_pixel(7, 7)[0], 255);
    assert_eq!(mask.get_pixel(0, 0)[0], 0);

    let light_on_dark = square_on(10, 250);
    let level = threshold_level(&light_on_dark, 200);
    let mask = binarize(&light_on_dark, level, ThresholdPolarity::Auto);
    assert_eq!(mask.get_pixel(7, 7)[0], 255);
    assert_eq!(mask.get_pixel(0, 0)[0], 0);
}

#[test]
fn test_forced_polarity_ignores_majority() {
    let light_on_dark = square_on(10, 250);

    let mask = binarize(&light_on_dark, 128, ThresholdPolarity::DarkForeground);
    assert_eq!(mask.get_pixel(0, 0)[0], 255);
    assert_eq!(mask.get_pixel(7, 7)[0], 0);

    let mask = binarize(&light_on_dark, 128, ThresholdPolarity::LightForeground);
    assert_eq!(mask.get_pixel(0, 0)[0], 0);
    assert_eq!(mask.get_pixel(7, 7)[0], 255);
}

#[test]
fn test_ceiling_caps_level() {
    let gray = square_on(250, 230);
    assert!(threshold_level(&gray, 100) <= 100);
}

#[test]
fn test_mask_is_binary() {
    let gray = GrayImage::from_fn(32, 32, |x, y| Luma([((x * 8 + y) % 256) as u8]));
    let level = threshold_level(&gray, 200);
    let mask = binarize(&gray, level, ThresholdPolarity::Auto);
    assert!(mask.pixels().all(|p| p[0] == 0 || p[0] == 255));
}

#[test]
fn test_closing_keeps_more_dilation_than_erosion() {
    let mut mask = GrayImage::new(21, 21);
    mask.put_pixel(10, 10, Luma([255]));

    let closed = close_gaps(&mask, 1, 2, 1);

    // Net growth of one pixel in every direction.
    assert_eq!(closed.get_pixel(9, 9)[0], 255);
    assert_eq!(closed.get_pixel(11, 11)[0], 255);
    assert_eq!(closed.get_pixel(8, 10)[0], 0);
}

#[test]
fn test_closing_joins_small_gap() {
    // Two segments of one line with a two-pixel gap.
    let mut mask = GrayImage::new(30, 9);
    for x in (3..13).chain(15..25) {
        mask.put_pixel(x, 4, Luma([255]));
    }

    let closed = close_gaps(&mask, 1, 2, 1);
    assert_eq!(closed.get_pixel(13, 4)[0], 255);
    assert_eq!(closed.get_pixel(14, 4)[0], 255);
}

#[test]
fn test_run_partial_stops_after_threshold() -> anyhow::Result<()> {
    let (img, shape) = reference_scene();
    let pipeline = insectcrop::segmentation::build_standard_pipeline(&SegmentationConfig::default());

    assert_eq!(
        pipeline.step_names(),
        vec!["Threshold", "Edge Detection", "Morphological Closing"]
    );

    let mask = pipeline.run_partial(&img, 1)?;
    assert_eq!(mask.dimensions(), (200, 200));
    assert_eq!(mask.get_pixel(shape.x + 5, shape.y + 5)[0], 255);
    assert_eq!(mask.get_pixel(5, 5)[0], 0);
    Ok(())
}

struct InvertStep;

impl PipelineStep for InvertStep {
    fn process(&self, image: &GrayImage, _context: &PipelineContext) -> insectcrop::Result<GrayImage> {
        let mut out = image.clone();
        image::imageops::invert(&mut out);
        Ok(out)
    }

    fn name(&self) -> &str {
        "Invert"
    }
}

#[test]
fn test_custom_steps_compose() -> anyhow::Result<()> {
    let img = uniform_image(10, 10, WHITE);
    let pipeline = Pipeline::new()
        .add_step_boxed(Box::new(InvertStep))
        .add_step(Arc::new(ThresholdStep {
            ceiling: 200,
            polarity: ThresholdPolarity::DarkForeground,
        }))
        .add_step(Arc::new(EdgeDetectionStep {
            low_threshold: 100.0,
            high_threshold: 200.0,
        }));

    let out = pipeline.run(&img)?;
    assert!(out.pixels().all(|p| p[0] == 0), "uniform input has no edges");
    Ok(())
}

#[test]
fn test_single_pixel_mask_has_edges() {
    let mut mask = GrayImage::new(20, 20);
    mask.put_pixel(10, 10, Luma([255]));

    let edges = detect_edges(&mask, 100.0, 200.0);

    for (x, y) in [(9, 10), (11, 10), (10, 9), (10, 11), (9, 9), (11, 11)] {
        assert_eq!(edges.get_pixel(x, y)[0], 255, "no edge at ({x}, {y})");
    }
    let far = edges
        .enumerate_pixels()
        .filter(|(x, y, p)| p[0] > 0 && (x.abs_diff(10) > 1 || y.abs_diff(10) > 1))
        .count();
    assert_eq!(far, 0, "edges must stay next to the pixel");
}

#[test]
fn test_step_edge_is_one_pixel_wide() {
    let mask = GrayImage::from_fn(30, 10, |x, _| if x < 15 { Luma([0]) } else { Luma([255]) });

    let edges = detect_edges(&mask, 100.0, 200.0);

    for y in 0..10 {
        let row: Vec<u32> = (0..30).filter(|&x| edges.get_pixel(x, y)[0] > 0).collect();
        assert_eq!(row, vec![14], "row {y}");
    }
}

#[test]
fn test_debug_context_follows_builder() -> anyhow::Result<()> {
    let dir = tempfile::TempDir::new()?;
    let debug_dir = dir.path().join("stages");

    assert!(Pipeline::new().context().debug.is_none());

    let pipeline = Pipeline::new().with_debug(&debug_dir)?;
    let debug = pipeline.context().debug.as_ref().expect("debug enabled");
    assert!(debug.enabled);
    assert_eq!(debug.output_dir, debug_dir);
    assert!(debug_dir.is_dir());
    Ok(())
}
