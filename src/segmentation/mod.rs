pub mod contours;
pub mod geometry;
pub mod preprocessing;
pub mod steps;

use std::path::PathBuf;
use std::sync::Arc;

use image::RgbImage;

use crate::config::SegmentationConfig;
use crate::error::{CropError, Result};
use crate::models::{BoundingBox, RotatedRect};
use crate::pipeline::Pipeline;
use steps::{ClosingStep, EdgeDetectionStep, ThresholdStep};

/// Classical single-object segmentation.
///
/// Threshold, edges and closing produce a boundary mask; the largest outer
/// contour of that mask is fitted with a minimum-area rectangle whose
/// axis-aligned extent is the result. Only one region is ever returned, and
/// it is always the largest one, even when that is not the object of
/// interest.
pub struct SegmentationPipeline {
    config: SegmentationConfig,
    pipeline: Pipeline,
}

impl SegmentationPipeline {
    pub fn new(config: SegmentationConfig) -> Result<Self> {
        config.validate()?;
        let pipeline = build_standard_pipeline(&config);
        Ok(Self { config, pipeline })
    }

    /// Save every intermediate mask into `output_dir` (must be empty).
    pub fn with_debug(mut self, output_dir: impl Into<PathBuf>) -> Result<Self> {
        self.pipeline = self.pipeline.with_debug(output_dir)?;
        Ok(self)
    }

    pub fn config(&self) -> &SegmentationConfig {
        &self.config
    }

    /// Locate the object. `Ok(None)` means no foreground region was found.
    pub fn segment(&self, image: &RgbImage) -> Result<Option<BoundingBox>> {
        let Some(rect) = self.fit_rect(image)? else {
            return Ok(None);
        };

        let bbox = rect.bounding_box().clamp_to(image.width(), image.height());
        tracing::debug!(%bbox, angle = rect.angle, "segmented region");
        Ok(Some(bbox))
    }

    /// Minimum-area rectangle around the largest foreground contour.
    pub fn fit_rect(&self, image: &RgbImage) -> Result<Option<RotatedRect>> {
        if image.width() == 0 || image.height() == 0 {
            return Err(CropError::EmptyImage {
                width: image.width(),
                height: image.height(),
            });
        }

        let mask = self.pipeline.run(image)?;

        let all_contours = contours::find_external_contours(&mask);
        tracing::debug!("Found {} external contours", all_contours.len());

        let Some(largest) = contours::largest_contour(&all_contours) else {
            tracing::debug!("no foreground contour");
            return Ok(None);
        };
        tracing::debug!(
            points = largest.len(),
            area = largest.area(),
            "largest contour"
        );

        Ok(geometry::min_area_rect(&largest.points))
    }
}

/// One-shot segmentation with the given configuration.
pub fn segment(image: &RgbImage, config: &SegmentationConfig) -> Result<Option<BoundingBox>> {
    SegmentationPipeline::new(config.clone())?.segment(image)
}

/// Build the threshold -> edges -> closing mask pipeline for `config`.
pub fn build_standard_pipeline(config: &SegmentationConfig) -> Pipeline {
    Pipeline::new()
        .add_step(Arc::new(ThresholdStep {
            ceiling: config.threshold_ceiling,
            polarity: config.polarity,
        }))
        .add_step(Arc::new(EdgeDetectionStep {
            low_threshold: config.edge_threshold_low as f32,
            high_threshold: config.edge_threshold_high as f32,
        }))
        .add_step(Arc::new(ClosingStep {
            radius: config.kernel_radius(),
            dilate_iterations: config.dilate_iterations,
            erode_iterations: config.erode_iterations,
        }))
}
