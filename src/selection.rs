//! Manual rectangle selection on a scaled view of the image.
//!
//! The image is shown at a display size that generally differs from its
//! native resolution. Points captured on the display are mapped back per
//! axis with `original = displayed * (original_dim / displayed_dim)`.
//! A [`DragGesture`] freezes its [`DisplayMapping`] at press time, so a view
//! resized mid-drag cannot skew the result.

use crate::error::{CropError, Result};
use crate::models::BoundingBox;

/// Point in display coordinates.
pub type DisplayPoint = (f32, f32);

/// Scale between a native image size and the size it is displayed at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayMapping {
    original: (u32, u32),
    display: (u32, u32),
}

impl DisplayMapping {
    pub fn new(original: (u32, u32), display: (u32, u32)) -> Result<Self> {
        if original.0 == 0 || original.1 == 0 {
            return Err(CropError::EmptyImage {
                width: original.0,
                height: original.1,
            });
        }
        if display.0 == 0 || display.1 == 0 {
            return Err(CropError::InvalidConfig(format!(
                "display size must be positive, got {}x{}",
                display.0, display.1
            )));
        }
        Ok(Self { original, display })
    }

    /// Same mapping, for an image shown at native size.
    pub fn identity(original: (u32, u32)) -> Result<Self> {
        Self::new(original, original)
    }

    /// Largest display size inside `max` keeping the aspect ratio.
    pub fn fit_within(original: (u32, u32), max: (u32, u32)) -> Result<Self> {
        if original.0 == 0 || original.1 == 0 {
            return Err(CropError::EmptyImage {
                width: original.0,
                height: original.1,
            });
        }
        let scale = (max.0 as f64 / original.0 as f64).min(max.1 as f64 / original.1 as f64);
        let display = (
            ((original.0 as f64 * scale) as u32).max(1),
            ((original.1 as f64 * scale) as u32).max(1),
        );
        Self::new(original, display)
    }

    pub fn original_size(&self) -> (u32, u32) {
        self.original
    }

    pub fn display_size(&self) -> (u32, u32) {
        self.display
    }

    /// Display-to-image factor per axis.
    pub fn scale(&self) -> (f64, f64) {
        (
            self.original.0 as f64 / self.display.0 as f64,
            self.original.1 as f64 / self.display.1 as f64,
        )
    }

    pub fn display_to_image(&self, point: DisplayPoint) -> (f64, f64) {
        let (sx, sy) = self.scale();
        (point.0 as f64 * sx, point.1 as f64 * sy)
    }

    pub fn image_to_display(&self, point: (f64, f64)) -> DisplayPoint {
        let (sx, sy) = self.scale();
        ((point.0 / sx) as f32, (point.1 / sy) as f32)
    }

    /// Image-space box spanned by two display corners given in any order.
    ///
    /// Each corner is mapped and truncated on its own, then the box is
    /// normalised and clamped to the image.
    pub fn to_image_box(&self, start: DisplayPoint, end: DisplayPoint) -> BoundingBox {
        let (x1, y1) = self.display_to_image(start);
        let (x2, y2) = self.display_to_image(end);
        BoundingBox::from_corners(x1 as i64, y1 as i64, x2 as i64, y2 as i64)
            .clamp_to(self.original.0, self.original.1)
    }
}

/// Press / move / release state of one rectangle drag.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DragGesture {
    #[default]
    Idle,
    Dragging {
        start: DisplayPoint,
        current: DisplayPoint,
        mapping: DisplayMapping,
    },
    Committed(BoundingBox),
}

impl DragGesture {
    pub fn new() -> Self {
        Self::Idle
    }

    /// Start a drag. Any previous drag or commit is discarded.
    pub fn press(&mut self, point: DisplayPoint, mapping: DisplayMapping) {
        *self = Self::Dragging {
            start: point,
            current: point,
            mapping,
        };
    }

    /// Track the live end point; ignored unless dragging.
    pub fn move_to(&mut self, point: DisplayPoint) {
        if let Self::Dragging { current, .. } = self {
            *current = point;
        }
    }

    /// Finish the drag at `point`.
    ///
    /// Returns the committed image-space box. A drag that covers no pixels
    /// goes back to `Idle` and commits nothing.
    pub fn release(&mut self, point: DisplayPoint) -> Option<BoundingBox> {
        let Self::Dragging { start, mapping, .. } = *self else {
            return None;
        };

        let bbox = mapping.to_image_box(start, point);
        if bbox.is_empty() {
            tracing::debug!("empty selection discarded");
            *self = Self::Idle;
            return None;
        }

        *self = Self::Committed(bbox);
        Some(bbox)
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    pub fn committed(&self) -> Option<BoundingBox> {
        match self {
            Self::Committed(bbox) => Some(*bbox),
            _ => None,
        }
    }

    /// Normalised `(x, y, width, height)` rectangle to draw while dragging,
    /// in display coordinates.
    pub fn preview(&self) -> Option<(f32, f32, f32, f32)> {
        match self {
            Self::Dragging { start, current, .. } => Some((
                start.0.min(current.0),
                start.1.min(current.1),
                (current.0 - start.0).abs(),
                (current.1 - start.1).abs(),
            )),
            _ => None,
        }
    }
}
