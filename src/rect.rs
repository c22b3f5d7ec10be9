//! Integer pixel bounding boxes.

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};

/// Axis-aligned bounding box on the pixel grid.
///
/// Stored in TLBR form: (x1, y1) is the top-left corner, (x2, y2) the
/// exclusive bottom-right corner. A valid box has `x1 < x2` and `y1 < y2`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

/// Pixel window `[top, bottom) x [left, right)`, possibly extending past the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CropBounds {
    pub top: i32,
    pub left: i32,
    pub bottom: i32,
    pub right: i32,
}

impl CropBounds {
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (
            (self.bottom - self.top).max(0) as usize,
            (self.right - self.left).max(0) as usize,
        )
    }
}

impl Rect {
    /// Create a Rect from TLBR format (top-left x, top-left y, bottom-right x, bottom-right y).
    #[inline]
    pub fn from_tlbr(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a Rect from top-left coordinates and dimensions (TLWH format).
    #[inline]
    pub fn from_tlwh(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x1: x,
            y1: y,
            x2: x + width,
            y2: y + height,
        }
    }

    /// Convert to TLBR format: (x1, y1, x2, y2).
    #[inline]
    pub fn to_tlbr(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    /// Convert to TLWH format: (x, y, width, height).
    #[inline]
    pub fn to_tlwh(&self) -> [i32; 4] {
        [self.x1, self.y1, self.width(), self.height()]
    }

    #[inline]
    pub fn width(&self) -> i32 {
        self.x2 - self.x1
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.y2 - self.y1
    }

    /// Center point, truncated onto the pixel grid: (cx, cy).
    #[inline]
    pub fn center(&self) -> (i32, i32) {
        (self.x1 + self.width() / 2, self.y1 + self.height() / 2)
    }

    #[inline]
    pub fn area(&self) -> i64 {
        self.width() as i64 * self.height() as i64
    }

    #[inline]
    pub fn is_valid(&self) -> bool {
        self.x1 < self.x2 && self.y1 < self.y2
    }

    /// Return the box unchanged, or an error if it has no area or its search
    /// window does not fit in `i32` coordinates.
    pub fn validated(self) -> Result<Self> {
        if !self.is_valid() {
            return Err(TrackError::DegenerateBox {
                x1: self.x1,
                y1: self.y1,
                x2: self.x2,
                y2: self.y2,
            });
        }
        let fits = |lo: i32, hi: i32| {
            let (lo, hi) = (i64::from(lo), i64::from(hi));
            let size = hi - lo;
            let center = lo + size / 2;
            center - size >= i64::from(i32::MIN) && center + size <= i64::from(i32::MAX)
        };
        if !(fits(self.x1, self.x2) && fits(self.y1, self.y2)) {
            return Err(TrackError::OversizedBox {
                x1: self.x1,
                y1: self.y1,
                x2: self.x2,
                y2: self.y2,
            });
        }
        Ok(self)
    }

    /// Shift the box by (dx, dy) pixels, keeping its size.
    #[inline]
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        Self {
            x1: self.x1 + dx,
            y1: self.y1 + dy,
            x2: self.x2 + dx,
            y2: self.y2 + dy,
        }
    }

    /// Search window twice the box size in each dimension, centered on the box.
    ///
    /// The window spans `center - size .. center + size` on both axes, so its
    /// shape is always `(2 * height, 2 * width)` regardless of frame bounds.
    pub fn crop_bounds(&self) -> CropBounds {
        let (cx, cy) = self.center();
        let (w, h) = (self.width(), self.height());
        CropBounds {
            top: cy - h,
            left: cx - w,
            bottom: cy + h,
            right: cx + w,
        }
    }

    /// Intersect the box with a `width x height` frame.
    ///
    /// The result may be invalid when the box lies entirely outside.
    pub fn clamp_to(&self, width: usize, height: usize) -> Self {
        let (w, h) = (width as i32, height as i32);
        Self {
            x1: self.x1.clamp(0, w),
            y1: self.y1.clamp(0, h),
            x2: self.x2.clamp(0, w),
            y2: self.y2.clamp(0, h),
        }
    }

    /// Whether at least one pixel of the box lies inside the frame.
    #[inline]
    pub fn overlaps_frame(&self, width: usize, height: usize) -> bool {
        self.is_valid() && self.clamp_to(width, height).is_valid()
    }
}

impl From<[i32; 4]> for Rect {
    fn from(tlbr: [i32; 4]) -> Self {
        Self::from_tlbr(tlbr[0], tlbr[1], tlbr[2], tlbr[3])
    }
}
