use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CropError, Result};

/// Which side of the automatic threshold counts as foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdPolarity {
    /// The class holding most pixels is background.
    #[default]
    Auto,
    /// Pixels at or below the level are foreground.
    DarkForeground,
    /// Pixels above the level are foreground.
    LightForeground,
}

/// Parameters of the classical segmentation pipeline.
///
/// The defaults reproduce the reference behaviour.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SegmentationConfig {
    pub edge_threshold_low: u32,
    pub edge_threshold_high: u32,
    pub morph_kernel_size: u32,
    pub dilate_iterations: u32,
    pub erode_iterations: u32,
    /// Upper bound on the Otsu level. Only images whose computed optimum
    /// exceeds it are affected.
    pub threshold_ceiling: u8,
    pub polarity: ThresholdPolarity,
}

impl Default for SegmentationConfig {
    fn default() -> Self {
        Self {
            edge_threshold_low: 100,
            edge_threshold_high: 200,
            morph_kernel_size: 3,
            dilate_iterations: 2,
            erode_iterations: 1,
            threshold_ceiling: 200,
            polarity: ThresholdPolarity::Auto,
        }
    }
}

impl SegmentationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.morph_kernel_size == 0 || self.morph_kernel_size % 2 == 0 {
            return Err(CropError::InvalidConfig(format!(
                "morph_kernel_size must be odd and positive, got {}",
                self.morph_kernel_size
            )));
        }
        if self.morph_kernel_size > 511 {
            return Err(CropError::InvalidConfig(format!(
                "morph_kernel_size {} is too large",
                self.morph_kernel_size
            )));
        }
        if self.edge_threshold_low > self.edge_threshold_high {
            return Err(CropError::InvalidConfig(format!(
                "edge_threshold_low ({}) exceeds edge_threshold_high ({})",
                self.edge_threshold_low, self.edge_threshold_high
            )));
        }
        Ok(())
    }

    /// Radius of the square structuring element (L-infinity ball).
    pub fn kernel_radius(&self) -> u8 {
        (self.morph_kernel_size / 2) as u8
    }
}

/// How the candidate to crop is picked from detector output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidateOrder {
    /// First candidate in the order the detector returned them.
    #[default]
    AsReturned,
    /// Highest confidence, earliest on ties.
    ByConfidence,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub order: CandidateOrder,
    pub min_confidence: f32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            order: CandidateOrder::AsReturned,
            min_confidence: 0.0,
        }
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub segmentation: SegmentationConfig,
    pub detector: DetectorConfig,
}

impl Config {
    /// Load a JSON config; missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(text)?;
        config.segmentation.validate()?;
        Ok(config)
    }
}
