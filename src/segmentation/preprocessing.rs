use image::{GrayImage, Luma, RgbImage};
use imageproc::contrast::otsu_level;
use imageproc::distance_transform::Norm;
use imageproc::gradients::{horizontal_sobel, vertical_sobel};
use imageproc::morphology::{dilate, erode};

use crate::config::ThresholdPolarity;

/// Convert image to grayscale (Rec. 601 luma)
pub fn to_grayscale(img: &RgbImage) -> GrayImage {
    image::imageops::grayscale(img)
}

/// Otsu level, capped at `ceiling`.
pub fn threshold_level(gray: &GrayImage, ceiling: u8) -> u8 {
    otsu_level(gray).min(ceiling)
}

/// Split `gray` at `level` into a {0, 255} mask.
///
/// Pixels `<= level` form the dark class. With `Auto` polarity the class
/// holding the majority of pixels becomes background; on an exact tie the
/// dark class is foreground.
pub fn binarize(gray: &GrayImage, level: u8, polarity: ThresholdPolarity) -> GrayImage {
    let dark_foreground = match polarity {
        ThresholdPolarity::DarkForeground => true,
        ThresholdPolarity::LightForeground => false,
        ThresholdPolarity::Auto => {
            let total = gray.width() as u64 * gray.height() as u64;
            let dark = gray.pixels().filter(|p| p[0] <= level).count() as u64;
            dark * 2 <= total
        }
    };

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let is_dark = gray.get_pixel(x, y)[0] <= level;
        if is_dark == dark_foreground {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

/// Canny edges computed directly on `img`, without Gaussian smoothing.
///
/// Sobel gradients with L1 magnitude, non-maximum suppression, then
/// hysteresis: pixels above `high_threshold` seed edges that grow through
/// 8-connected pixels above `low_threshold`. Unsmoothed, a one-pixel blob in
/// a binary mask still produces a ring of edges.
pub fn detect_edges(img: &GrayImage, low_threshold: f32, high_threshold: f32) -> GrayImage {
    let (width, height) = img.dimensions();
    let gx: Vec<f32> = horizontal_sobel(img).pixels().map(|p| p[0] as f32).collect();
    let gy: Vec<f32> = vertical_sobel(img).pixels().map(|p| p[0] as f32).collect();
    let magnitude: Vec<f32> = gx.iter().zip(&gy).map(|(x, y)| x.abs() + y.abs()).collect();

    let grid = Grid {
        width: width as usize,
        height: height as usize,
    };
    let thinned = non_max_suppression(&grid, &gx, &gy, &magnitude);
    let edges = hysteresis(&grid, &thinned, low_threshold, high_threshold);

    GrayImage::from_fn(width, height, |x, y| {
        if edges[grid.index(x as usize, y as usize)] {
            Luma([255u8])
        } else {
            Luma([0u8])
        }
    })
}

struct Grid {
    width: usize,
    height: usize,
}

impl Grid {
    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    /// Value at `(x, y)`, zero outside the grid.
    fn at(&self, values: &[f32], x: isize, y: isize) -> f32 {
        if x < 0 || y < 0 || x >= self.width as isize || y >= self.height as isize {
            return 0.0;
        }
        values[self.index(x as usize, y as usize)]
    }
}

fn non_max_suppression(grid: &Grid, gx: &[f32], gy: &[f32], magnitude: &[f32]) -> Vec<f32> {
    const TAN22_5: f32 = 0.414_213_57;
    const TAN67_5: f32 = 2.414_213_7;

    let mut thinned = vec![0.0f32; magnitude.len()];
    for y in 0..grid.height {
        for x in 0..grid.width {
            let idx = grid.index(x, y);
            let m = magnitude[idx];
            if m <= 0.0 {
                continue;
            }

            let (ax, ay) = (gx[idx].abs(), gy[idx].abs());
            let (xi, yi) = (x as isize, y as isize);
            let at = |dx: isize, dy: isize| grid.at(magnitude, xi + dx, yi + dy);

            // Ties along the gradient keep only the first pixel of a plateau.
            let keep = if ay <= ax * TAN22_5 {
                m > at(-1, 0) && m >= at(1, 0)
            } else if ay >= ax * TAN67_5 {
                m > at(0, -1) && m >= at(0, 1)
            } else if gx[idx] * gy[idx] > 0.0 {
                m > at(-1, -1) && m > at(1, 1)
            } else {
                m > at(1, -1) && m > at(-1, 1)
            };

            if keep {
                thinned[idx] = m;
            }
        }
    }
    thinned
}

fn hysteresis(grid: &Grid, thinned: &[f32], low: f32, high: f32) -> Vec<bool> {
    let mut edge: Vec<bool> = thinned.iter().map(|&m| m > high).collect();
    let mut stack: Vec<usize> = (0..edge.len()).filter(|&i| edge[i]).collect();

    while let Some(idx) = stack.pop() {
        let (x, y) = (idx % grid.width, idx / grid.width);
        for ny in y.saturating_sub(1)..=(y + 1).min(grid.height - 1) {
            for nx in x.saturating_sub(1)..=(x + 1).min(grid.width - 1) {
                let n = grid.index(nx, ny);
                if !edge[n] && thinned[n] > low {
                    edge[n] = true;
                    stack.push(n);
                }
            }
        }
    }
    edge
}

/// Dilate then erode with a square kernel of the given radius.
///
/// Dilation may outnumber erosion; the surplus leaves boundaries thicker.
pub fn close_gaps(
    mask: &GrayImage,
    radius: u8,
    dilate_iterations: u32,
    erode_iterations: u32,
) -> GrayImage {
    let mut out = mask.clone();
    for _ in 0..dilate_iterations {
        out = dilate(&out, Norm::LInf, radius);
    }
    for _ in 0..erode_iterations {
        out = erode(&out, Norm::LInf, radius);
    }
    out
}
