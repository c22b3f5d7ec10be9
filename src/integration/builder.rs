//! Builder for creating Rect objects from various box formats.

use crate::error::Result;
use crate::rect::Rect;

/// Builder for creating [`Rect`] seeds from various input formats.
///
/// Float inputs are truncated onto the pixel grid.
#[derive(Debug, Clone, Default)]
pub struct RectBuilder {
    x1: f32,
    y1: f32,
    x2: f32,
    y2: f32,
}

impl RectBuilder {
    /// Create a new rect builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.x1 = x1;
        self.y1 = y1;
        self.x2 = x2;
        self.y2 = y2;
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: f32, cy: f32, w: f32, h: f32) -> Self {
        self.x1 = cx - w / 2.0;
        self.y1 = cy - h / 2.0;
        self.x2 = cx + w / 2.0;
        self.y2 = cy + h / 2.0;
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, l: f32, t: f32, w: f32, h: f32) -> Self {
        self.x1 = l;
        self.y1 = t;
        self.x2 = l + w;
        self.y2 = t + h;
        self
    }

    /// Build the final `Rect`, rejecting boxes without area.
    pub fn build(self) -> Result<Rect> {
        Rect::from_tlbr(
            self.x1.floor() as i32,
            self.y1.floor() as i32,
            self.x2.floor() as i32,
            self.y2.floor() as i32,
        )
        .validated()
    }
}
