use ndarray::{Array2, ArrayView2};

use crate::error::{Result, TrackError};
use crate::rect::Rect;
use crate::signal::window::apply_window;

/// Extract the windowed search patch around `rect`.
///
/// The patch covers twice the box extent in each dimension, centered on the
/// box, so its shape is always `(2 * height, 2 * width)`. Pixels past the frame
/// border replicate the nearest edge pixel. Boxes larger than the frame are
/// rejected.
pub fn crop_region(frame: ArrayView2<'_, u8>, rect: &Rect) -> Result<Array2<f64>> {
    let rect = rect.validated()?;
    let (frame_h, frame_w) = frame.dim();
    if frame_h == 0 || frame_w == 0 {
        return Err(TrackError::EmptyFrame);
    }
    if !rect.overlaps_frame(frame_w, frame_h) {
        return Err(TrackError::OutOfFrame {
            x1: rect.x1,
            y1: rect.y1,
            x2: rect.x2,
            y2: rect.y2,
            width: frame_w,
            height: frame_h,
        });
    }
    if rect.width() as usize > frame_w || rect.height() as usize > frame_h {
        return Err(TrackError::OversizedBox {
            x1: rect.x1,
            y1: rect.y1,
            x2: rect.x2,
            y2: rect.y2,
        });
    }

    let bounds = rect.crop_bounds();
    let max_y = frame_h as i32 - 1;
    let max_x = frame_w as i32 - 1;
    let patch = Array2::from_shape_fn(bounds.shape(), |(i, j)| {
        let y = (bounds.top + i as i32).clamp(0, max_y) as usize;
        let x = (bounds.left + j as i32).clamp(0, max_x) as usize;
        frame[[y, x]] as f64
    });

    Ok(apply_window(patch.view()))
}
