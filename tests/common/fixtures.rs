use image::{Rgb, RgbImage};
use insectcrop::BoundingBox;
use tempfile::NamedTempFile;

pub const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
pub const BLACK: Rgb<u8> = Rgb([0, 0, 0]);

/// Uniform `background` image with a solid `shape` rectangle.
pub fn rect_on_background(
    width: u32,
    height: u32,
    shape: BoundingBox,
    foreground: Rgb<u8>,
    background: Rgb<u8>,
) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        let inside = x >= shape.x
            && (x as u64) < shape.right()
            && y >= shape.y
            && (y as u64) < shape.bottom();
        if inside { foreground } else { background }
    })
}

/// The reference scenario: a black 50x30 block at (60, 80) on 200x200 white.
pub fn reference_scene() -> (RgbImage, BoundingBox) {
    let shape = BoundingBox::new(60, 80, 50, 30);
    (rect_on_background(200, 200, shape, BLACK, WHITE), shape)
}

pub fn uniform_image(width: u32, height: u32, color: Rgb<u8>) -> RgbImage {
    RgbImage::from_pixel(width, height, color)
}

/// Image whose every pixel is distinct, for checking crop contents.
pub fn patterned_image(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, ((x * 7 + y * 13) % 256) as u8])
    })
}

/// Filled diamond `|x - cx| + |y - cy| <= radius`.
pub fn diamond_on_white(size: u32, center: (u32, u32), radius: u32) -> RgbImage {
    RgbImage::from_fn(size, size, |x, y| {
        let d = x.abs_diff(center.0) + y.abs_diff(center.1);
        if d <= radius { BLACK } else { WHITE }
    })
}

/// Writes `img` to a temporary PNG file, removed when dropped.
pub fn write_temp_png(img: &RgbImage) -> NamedTempFile {
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

/// Grow `bbox` by `margin` on every side (saturating at zero).
pub fn expanded(bbox: BoundingBox, margin: u32) -> BoundingBox {
    let x = bbox.x.saturating_sub(margin);
    let y = bbox.y.saturating_sub(margin);
    BoundingBox::new(
        x,
        y,
        bbox.x + bbox.width + margin - x,
        bbox.y + bbox.height + margin - y,
    )
}

pub fn assert_within(actual: BoundingBox, expected: BoundingBox, tolerance: u32) {
    let edges = [
        (actual.x as i64, expected.x as i64, "left"),
        (actual.y as i64, expected.y as i64, "top"),
        (actual.right() as i64, expected.right() as i64, "right"),
        (actual.bottom() as i64, expected.bottom() as i64, "bottom"),
    ];
    for (a, e, edge) in edges {
        assert!(
            (a - e).abs() <= tolerance as i64,
            "{edge} edge off by {}: got {actual}, expected {expected}",
            a - e
        );
    }
}
