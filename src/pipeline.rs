use std::path::{Path, PathBuf};
use std::sync::Arc;

use image::{GrayImage, RgbImage};

use crate::error::{CropError, Result};
use crate::segmentation::preprocessing;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Directory receiving one PNG per stage
    pub output_dir: PathBuf,
    pub enabled: bool,
}

/// Context available to all pipeline steps
#[derive(Clone, Debug, Default)]
pub struct PipelineContext {
    pub debug: Option<DebugConfig>,
}

impl PipelineContext {
    fn debug_dir(&self) -> Option<&Path> {
        self.debug
            .as_ref()
            .filter(|d| d.enabled)
            .map(|d| d.output_dir.as_path())
    }

    /// Write one stage image if debug output is on.
    pub fn save_stage(&self, index: usize, name: &str, image: &GrayImage) -> Result<()> {
        let Some(dir) = self.debug_dir() else {
            return Ok(());
        };

        let filename = format!("{:02}_{}.png", index, stage_slug(name));
        image
            .save(dir.join(&filename))
            .map_err(|e| match e {
                image::ImageError::IoError(io) => CropError::Io(io),
                other => CropError::Encode(other),
            })?;

        tracing::debug!("Debug: saved {}", filename);
        Ok(())
    }

    fn save_input(&self, image: &RgbImage) -> Result<()> {
        let Some(dir) = self.debug_dir() else {
            return Ok(());
        };

        crate::imageio::save_image(image, dir.join("00_input.png"))?;
        tracing::debug!("Debug: saved 00_input.png");
        Ok(())
    }
}

fn stage_slug(name: &str) -> String {
    name.to_lowercase().replace(' ', "_")
}

/// One single-channel stage of the mask pipeline.
pub trait PipelineStep: Send + Sync {
    fn process(&self, image: &GrayImage, context: &PipelineContext) -> Result<GrayImage>;

    /// Human-readable name, also used for debug file names
    fn name(&self) -> &str;
}

/// Composable mask pipeline builder.
///
/// The input is always converted to grayscale first; the added steps then
/// run in order on the single-channel result.
#[derive(Clone, Default)]
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable debug mode with output directory.
    /// The directory must be empty or non-existent.
    pub fn with_debug(mut self, output_dir: impl Into<PathBuf>) -> Result<Self> {
        let output_dir = output_dir.into();
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(CropError::InvalidConfig(format!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                )));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig {
            output_dir,
            enabled: true,
        });

        Ok(self)
    }

    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn step_names(&self) -> Vec<&str> {
        self.steps.iter().map(|s| s.name()).collect()
    }

    pub fn context(&self) -> &PipelineContext {
        &self.context
    }

    /// Run every step and return the final mask.
    pub fn run(&self, input: &RgbImage) -> Result<GrayImage> {
        self.run_partial(input, self.steps.len())
    }

    /// Run grayscale conversion plus the first `num_steps` steps.
    pub fn run_partial(&self, input: &RgbImage, num_steps: usize) -> Result<GrayImage> {
        self.context.save_input(input)?;

        let mut current = preprocessing::to_grayscale(input);
        self.context.save_stage(1, "Grayscale", &current)?;

        for (i, step) in self.steps.iter().take(num_steps).enumerate() {
            tracing::debug!("Running step {}: {}", i + 1, step.name());
            current = step.process(&current, &self.context)?;
            self.context.save_stage(i + 2, step.name(), &current)?;
        }

        Ok(current)
    }
}
