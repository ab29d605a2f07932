use image::GrayImage;

use crate::config::ThresholdPolarity;
use crate::error::Result;
use crate::pipeline::{PipelineContext, PipelineStep};
use crate::segmentation::preprocessing;

/// Otsu binarisation with a ceiling on the level
pub struct ThresholdStep {
    pub ceiling: u8,
    pub polarity: ThresholdPolarity,
}

impl PipelineStep for ThresholdStep {
    fn process(&self, image: &GrayImage, _context: &PipelineContext) -> Result<GrayImage> {
        let level = preprocessing::threshold_level(image, self.ceiling);
        tracing::debug!(level, ceiling = self.ceiling, "threshold level selected");
        Ok(preprocessing::binarize(image, level, self.polarity))
    }

    fn name(&self) -> &str {
        "Threshold"
    }
}

/// Detect edges using Canny
pub struct EdgeDetectionStep {
    pub low_threshold: f32,
    pub high_threshold: f32,
}

impl PipelineStep for EdgeDetectionStep {
    fn process(&self, image: &GrayImage, _context: &PipelineContext) -> Result<GrayImage> {
        Ok(preprocessing::detect_edges(
            image,
            self.low_threshold,
            self.high_threshold,
        ))
    }

    fn name(&self) -> &str {
        "Edge Detection"
    }
}

/// Dilate/erode to join fragmented boundaries
pub struct ClosingStep {
    pub radius: u8,
    pub dilate_iterations: u32,
    pub erode_iterations: u32,
}

impl PipelineStep for ClosingStep {
    fn process(&self, image: &GrayImage, _context: &PipelineContext) -> Result<GrayImage> {
        Ok(preprocessing::close_gaps(
            image,
            self.radius,
            self.dilate_iterations,
            self.erode_iterations,
        ))
    }

    fn name(&self) -> &str {
        "Morphological Closing"
    }
}
