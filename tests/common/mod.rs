mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from insectcrop for tests
pub use insectcrop::{
    BoundingBox, Candidate, CandidateOrder, Config, CropError, CropOutcome, CropSession,
    DetectorConfig, DisplayMapping, DragGesture, JsonDetector, LazyDetector, SegmentationConfig,
    SegmentationPipeline, Strategy, ThresholdPolarity,
};
