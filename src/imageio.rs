use std::io::Cursor;
use std::path::Path;

use image::{ImageError, ImageFormat, ImageReader, RgbImage};

use crate::error::{CropError, Result};

/// Load an image file and convert it to 8-bit RGB.
pub fn load_image(path: impl AsRef<Path>) -> Result<RgbImage> {
    let img = ImageReader::open(path.as_ref())?
        .with_guessed_format()?
        .decode()
        .map_err(CropError::Decode)?;

    Ok(img.to_rgb8())
}

/// Decode an in-memory PNG/JPEG/BMP (or any format `image` recognises).
pub fn decode_image(bytes: &[u8]) -> Result<RgbImage> {
    let img = image::load_from_memory(bytes).map_err(CropError::Decode)?;
    Ok(img.to_rgb8())
}

/// Encode to a buffer in `format`.
pub fn encode_image(image: &RgbImage, format: ImageFormat) -> Result<Vec<u8>> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, format)
        .map_err(CropError::Encode)?;
    Ok(buffer.into_inner())
}

/// Save with the format implied by the file extension.
///
/// The whole file is encoded in memory first so an encoder failure never
/// leaves a half-written file behind.
pub fn save_image(image: &RgbImage, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let format = ImageFormat::from_path(path).map_err(|e| match e {
        ImageError::IoError(io) => CropError::Io(io),
        other => CropError::Encode(other),
    })?;
    save_image_with_format(image, path, format)
}

pub fn save_image_with_format(
    image: &RgbImage,
    path: impl AsRef<Path>,
    format: ImageFormat,
) -> Result<()> {
    let bytes = encode_image(image, format)?;
    std::fs::write(path.as_ref(), bytes)?;
    tracing::debug!(path = %path.as_ref().display(), ?format, "saved image");
    Ok(())
}
