use std::fmt;

use imageproc::point::Point;

/// Axis-aligned rectangle in image pixel coordinates.
///
/// Unsigned fields keep the size non-negative; `clamp_to` is what keeps it
/// inside a particular image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl BoundingBox {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Build a box from two opposite corners given in any order.
    ///
    /// Corners are half-open: `(x2, y2)` is one past the last column/row.
    /// Negative coordinates are pulled back to zero.
    pub fn from_corners(x1: i64, y1: i64, x2: i64, y2: i64) -> Self {
        let left = to_u32(x1.min(x2));
        let right = to_u32(x1.max(x2));
        let top = to_u32(y1.min(y2));
        let bottom = to_u32(y1.max(y2));
        Self {
            x: left,
            y: top,
            width: right - left,
            height: bottom - top,
        }
    }

    /// One past the last column.
    pub fn right(&self) -> u64 {
        self.x as u64 + self.width as u64
    }

    /// One past the last row.
    pub fn bottom(&self) -> u64 {
        self.y as u64 + self.height as u64
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        self.right() <= width as u64 && self.bottom() <= height as u64
    }

    /// Intersect with the `width` x `height` image rectangle.
    pub fn clamp_to(&self, width: u32, height: u32) -> Self {
        let x = self.x.min(width);
        let y = self.y.min(height);
        let right = self.right().min(width as u64) as u32;
        let bottom = self.bottom().min(height as u64) as u32;
        Self {
            x,
            y,
            width: right - x,
            height: bottom - y,
        }
    }

    /// True when `other` lies entirely inside this box.
    pub fn contains(&self, other: &BoundingBox) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

fn to_u32(v: i64) -> u32 {
    v.clamp(0, u32::MAX as i64) as u32
}

/// Closed outer boundary of one connected foreground region.
#[derive(Debug, Clone, PartialEq)]
pub struct Contour {
    pub points: Vec<Point<i32>>,
}

impl Contour {
    pub fn new(points: Vec<Point<i32>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Enclosed polygon area (shoelace formula).
    pub fn area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }

        let mut twice_area = 0.0f64;
        for i in 0..n {
            let p = self.points[i];
            let q = self.points[(i + 1) % n];
            twice_area += p.x as f64 * q.y as f64 - q.x as f64 * p.y as f64;
        }

        (twice_area * 0.5).abs()
    }
}

/// Minimum-area rectangle at any rotation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotatedRect {
    pub center: (f32, f32),
    /// Side lengths: `.0` along `angle`, `.1` perpendicular to it.
    pub size: (f32, f32),
    /// Rotation in degrees.
    pub angle: f32,
}

impl RotatedRect {
    pub fn area(&self) -> f32 {
        self.size.0 * self.size.1
    }

    /// The four vertices, walking around the rectangle.
    pub fn corners(&self) -> [(f32, f32); 4] {
        let theta = self.angle.to_radians();
        let (half_sin, half_cos) = (theta.sin() * 0.5, theta.cos() * 0.5);
        let (cx, cy) = self.center;
        let (w, h) = self.size;

        let p0 = (cx - half_sin * h - half_cos * w, cy + half_cos * h - half_sin * w);
        let p1 = (cx + half_sin * h - half_cos * w, cy - half_cos * h - half_sin * w);
        let p2 = (2.0 * cx - p0.0, 2.0 * cy - p0.1);
        let p3 = (2.0 * cx - p1.0, 2.0 * cy - p1.1);

        [p0, p1, p2, p3]
    }

    /// Axis-aligned box around the integer-truncated corners.
    ///
    /// The span is inclusive of both extreme pixels, so a degenerate
    /// rectangle still covers one pixel.
    pub fn bounding_box(&self) -> BoundingBox {
        let corners = self.corners().map(|(x, y)| (x as i64, y as i64));

        let min_x = corners.iter().map(|c| c.0).min().unwrap_or(0);
        let max_x = corners.iter().map(|c| c.0).max().unwrap_or(0);
        let min_y = corners.iter().map(|c| c.1).min().unwrap_or(0);
        let max_y = corners.iter().map(|c| c.1).max().unwrap_or(0);

        BoundingBox::from_corners(min_x, min_y, max_x + 1, max_y + 1)
    }
}

/// One box proposed by an object detector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub bbox: BoundingBox,
    pub confidence: f32,
    pub class_id: u32,
}
