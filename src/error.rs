use thiserror::Error;

use crate::models::BoundingBox;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),

    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Crop region {bbox} is empty after clamping to the image")]
    EmptyRegion { bbox: BoundingBox },

    #[error("Image has no pixels ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },

    #[error("No image loaded")]
    NoImageLoaded,

    #[error("No crop to save")]
    NoCrop,

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Detector error: {0}")]
    Detector(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CropError>;
