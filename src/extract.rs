use image::RgbImage;

use crate::error::{CropError, Result};
use crate::models::BoundingBox;

/// Copy the `bbox` region out of `image` into a new buffer.
///
/// Boxes reaching outside the image are clamped first. A box left with no
/// width or height fails with `EmptyRegion`.
pub fn extract(image: &RgbImage, bbox: &BoundingBox) -> Result<RgbImage> {
    let clamped = bbox.clamp_to(image.width(), image.height());
    if clamped.is_empty() {
        return Err(CropError::EmptyRegion { bbox: *bbox });
    }
    if clamped != *bbox {
        tracing::debug!(requested = %bbox, clamped = %clamped, "crop box clamped to image");
    }

    let cropped = image::imageops::crop_imm(
        image,
        clamped.x,
        clamped.y,
        clamped.width,
        clamped.height,
    )
    .to_image();

    Ok(cropped)
}
