use image::{Rgb, RgbImage};

fn main() -> anyhow::Result<()> {
    let mut img = RgbImage::from_pixel(800, 600, Rgb([235, 232, 225]));

    // Dark elongated body with a lighter head, slightly rotated
    let (cx, cy) = (420.0f32, 290.0f32);
    let angle = 20.0f32.to_radians();
    let (sin, cos) = angle.sin_cos();
    for y in 0..600 {
        for x in 0..800 {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let u = dx * cos + dy * sin;
            let v = -dx * sin + dy * cos;
            let body = (u / 140.0).powi(2) + (v / 45.0).powi(2) <= 1.0;
            let head = ((u - 150.0) / 30.0).powi(2) + (v / 28.0).powi(2) <= 1.0;
            if body {
                img.put_pixel(x, y, Rgb([40, 30, 20]));
            } else if head {
                img.put_pixel(x, y, Rgb([70, 55, 35]));
            }
        }
    }

    img.save("test_insect.png")?;
    println!("Created test_insect.png (800x600, dark insect on light background)");
    Ok(())
}
