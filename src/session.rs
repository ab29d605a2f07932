use std::path::{Path, PathBuf};

use image::RgbImage;

use crate::config::{DetectorConfig, SegmentationConfig};
use crate::detector::{self, Detector};
use crate::error::{CropError, Result};
use crate::extract::extract;
use crate::imageio;
use crate::models::BoundingBox;
use crate::segmentation::SegmentationPipeline;

/// How the crop region is found.
pub enum Strategy<'a> {
    Segmentation(&'a SegmentationPipeline),
    Manual(BoundingBox),
    Detector(&'a dyn Detector, &'a DetectorConfig),
}

/// Result of one crop attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CropOutcome {
    Cropped(BoundingBox),
    /// Nothing located; the session is unchanged.
    NotFound,
}

/// Working image and latest crop of one editing session.
#[derive(Debug, Clone, Default)]
pub struct CropSession {
    image: Option<RgbImage>,
    source_name: Option<String>,
    crop: Option<RgbImage>,
}

impl CropSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a new working image, dropping any previous crop.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let image = imageio::load_image(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned());
        tracing::info!("Loaded {}: {}x{}", path.display(), image.width(), image.height());
        self.set_image(image, name);
        Ok(())
    }

    pub fn load_bytes(&mut self, bytes: &[u8], name: Option<String>) -> Result<()> {
        let image = imageio::decode_image(bytes)?;
        self.set_image(image, name);
        Ok(())
    }

    pub fn set_image(&mut self, image: RgbImage, name: Option<String>) {
        self.image = Some(image);
        self.source_name = name;
        self.crop = None;
    }

    pub fn image(&self) -> Option<&RgbImage> {
        self.image.as_ref()
    }

    pub fn crop_image(&self) -> Option<&RgbImage> {
        self.crop.as_ref()
    }

    pub fn source_name(&self) -> Option<&str> {
        self.source_name.as_deref()
    }

    /// Locate a region with `strategy` and crop it from the working image.
    ///
    /// On `NotFound` the previous crop is kept as it was.
    pub fn crop(&mut self, strategy: Strategy<'_>) -> Result<CropOutcome> {
        let image = self.image.as_ref().ok_or(CropError::NoImageLoaded)?;

        let located = match strategy {
            Strategy::Segmentation(pipeline) => pipeline.segment(image)?,
            Strategy::Manual(bbox) => Some(bbox),
            Strategy::Detector(detector, config) => detector::locate(detector, image, config)?,
        };

        let Some(bbox) = located else {
            return Ok(CropOutcome::NotFound);
        };

        let cropped = extract(image, &bbox)?;
        let bbox = bbox.clamp_to(image.width(), image.height());
        tracing::info!("Cropped region {}", bbox);
        self.crop = Some(cropped);
        Ok(CropOutcome::Cropped(bbox))
    }

    /// Convenience for the default segmentation configuration.
    pub fn crop_segmented(&mut self, config: &SegmentationConfig) -> Result<CropOutcome> {
        let pipeline = SegmentationPipeline::new(config.clone())?;
        self.crop(Strategy::Segmentation(&pipeline))
    }

    /// Make the current crop the working image so it can be cropped again.
    pub fn accept_crop(&mut self) -> Result<()> {
        let crop = self.crop.take().ok_or(CropError::NoCrop)?;
        self.image = Some(crop);
        Ok(())
    }

    pub fn save_crop(&self, path: impl AsRef<Path>) -> Result<()> {
        let crop = self.crop.as_ref().ok_or(CropError::NoCrop)?;
        imageio::save_image(crop, path.as_ref())?;
        tracing::info!("Cropped image saved to {}", path.as_ref().display());
        Ok(())
    }

    /// `<stem>_crop.png` in `dir`, falling back to `crop.png`.
    pub fn default_crop_path(&self, dir: impl AsRef<Path>) -> PathBuf {
        dir.as_ref().join(default_crop_name(self.source_name.as_deref()))
    }
}

pub fn default_crop_name(source_name: Option<&str>) -> String {
    let stem = source_name
        .map(Path::new)
        .and_then(|p| p.file_stem())
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty());

    match stem {
        Some(stem) => format!("{stem}_crop.png"),
        None => "crop.png".to_string(),
    }
}
