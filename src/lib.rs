pub mod config;
pub mod detector;
pub mod error;
pub mod extract;
pub mod imageio;
pub mod models;
pub mod pipeline;
pub mod segmentation;
pub mod selection;
pub mod session;

pub use config::{CandidateOrder, Config, DetectorConfig, SegmentationConfig, ThresholdPolarity};
pub use detector::{Detector, JsonDetector, LazyDetector};
pub use error::{CropError, Result};
pub use extract::extract;
pub use models::{BoundingBox, Candidate, Contour, RotatedRect};
pub use pipeline::{Pipeline, PipelineContext, PipelineStep};
pub use segmentation::{SegmentationPipeline, segment};
pub use selection::{DisplayMapping, DragGesture};
pub use session::{CropOutcome, CropSession, Strategy};
