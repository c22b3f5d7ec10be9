//! Sum-of-squared-differences template matching.

use ndarray::{Array2, s};
use tracing::{debug, warn};

use crate::error::{Result, TrackError};
use crate::rect::Rect;
use crate::tracker::capability::{FrameView, Tracker};
use crate::tracker::track_state::TrackState;

/// Classical template tracker.
///
/// Keeps the pixels of the seed box and searches a square neighborhood of the
/// last position for the placement with the lowest mean squared difference.
/// The template never adapts, and placements must lie fully inside the frame.
#[derive(Debug, Clone)]
pub struct TemplateTracker {
    search_radius: i32,
    state: TrackState,
    template: Option<Array2<f64>>,
    last_rect: Option<Rect>,
}

impl Default for TemplateTracker {
    fn default() -> Self {
        Self::new(16)
    }
}

impl TemplateTracker {
    /// Tracker searching up to `search_radius` pixels around the last position on each axis.
    pub fn new(search_radius: u16) -> Self {
        Self {
            search_radius: i32::from(search_radius),
            state: TrackState::Uninitialized,
            template: None,
            last_rect: None,
        }
    }

    fn mean_squared_difference(
        template: &Array2<f64>,
        frame: FrameView<'_>,
        x: usize,
        y: usize,
    ) -> f64 {
        let (h, w) = template.dim();
        let window = frame.slice(s![y..y + h, x..x + w]);
        let mut sum = 0.0;
        for (t, &p) in template.iter().zip(window.iter()) {
            let d = t - p as f64;
            sum += d * d;
        }
        sum / template.len() as f64
    }
}

impl Tracker for TemplateTracker {
    fn init(&mut self, frame: FrameView<'_>, rect: Rect) -> Result<()> {
        if self.state != TrackState::Uninitialized {
            return Err(TrackError::AlreadyInitialized);
        }
        let rect = rect.validated()?;
        let (frame_h, frame_w) = frame.dim();
        if frame_h == 0 || frame_w == 0 {
            return Err(TrackError::EmptyFrame);
        }
        if rect.clamp_to(frame_w, frame_h) != rect {
            return Err(TrackError::OutOfFrame {
                x1: rect.x1,
                y1: rect.y1,
                x2: rect.x2,
                y2: rect.y2,
                width: frame_w,
                height: frame_h,
            });
        }

        let template = frame
            .slice(s![
                rect.y1 as usize..rect.y2 as usize,
                rect.x1 as usize..rect.x2 as usize
            ])
            .mapv(f64::from);
        debug!(rect = ?rect.to_tlbr(), "template tracker initialized");

        self.template = Some(template);
        self.last_rect = Some(rect);
        self.state = TrackState::Tracking;
        Ok(())
    }

    fn update(&mut self, frame: FrameView<'_>) -> Result<Rect> {
        match self.state {
            TrackState::Uninitialized => return Err(TrackError::NotInitialized),
            TrackState::Lost => return Err(TrackError::TargetLost),
            TrackState::Tracking => {}
        }
        let (Some(template), Some(last)) = (&self.template, self.last_rect) else {
            return Err(TrackError::NotInitialized);
        };

        let (frame_h, frame_w) = frame.dim();
        let (w, h) = (last.width(), last.height());
        let max_x = frame_w as i32 - w;
        let max_y = frame_h as i32 - h;
        if max_x < 0 || max_y < 0 {
            warn!(rect = ?last.to_tlbr(), "template no longer fits in frame");
            self.state = TrackState::Lost;
            return Err(TrackError::OutOfFrame {
                x1: last.x1,
                y1: last.y1,
                x2: last.x2,
                y2: last.y2,
                width: frame_w,
                height: frame_h,
            });
        }

        let r = self.search_radius;
        let mut best = (last.x1.clamp(0, max_x), last.y1.clamp(0, max_y));
        let mut best_score = f64::INFINITY;
        for y in (last.y1 - r).max(0)..=(last.y1 + r).min(max_y) {
            for x in (last.x1 - r).max(0)..=(last.x1 + r).min(max_x) {
                let score = Self::mean_squared_difference(template, frame, x as usize, y as usize);
                if score < best_score {
                    best_score = score;
                    best = (x, y);
                }
            }
        }

        let rect = Rect::from_tlwh(best.0, best.1, w, h);
        self.last_rect = Some(rect);
        Ok(rect)
    }

    fn state(&self) -> TrackState {
        self.state
    }

    fn name(&self) -> &'static str {
        "template"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square_at(x: usize, y: usize) -> Array2<u8> {
        Array2::from_shape_fn((80, 80), |(r, c)| {
            if (y..y + 10).contains(&r) && (x..x + 10).contains(&c) {
                200 + ((r - y) * 5 + (c - x)) as u8
            } else {
                10
            }
        })
    }

    #[test]
    fn test_follows_translated_square() {
        let mut tracker = TemplateTracker::new(8);
        tracker
            .init(square_at(30, 30).view(), Rect::from_tlwh(30, 30, 10, 10))
            .unwrap();
        let rect = tracker.update(square_at(34, 27).view()).unwrap();
        assert_eq!(rect, Rect::from_tlwh(34, 27, 10, 10));
    }

    #[test]
    fn test_widest_radius_searches_whole_frame() {
        let mut tracker = TemplateTracker::new(u16::MAX);
        tracker
            .init(square_at(5, 60).view(), Rect::from_tlwh(5, 60, 10, 10))
            .unwrap();
        let rect = tracker.update(square_at(62, 3).view()).unwrap();
        assert_eq!(rect, Rect::from_tlwh(62, 3, 10, 10));
    }

    #[test]
    fn test_init_requires_box_inside_frame() {
        let mut tracker = TemplateTracker::default();
        assert!(matches!(
            tracker.init(square_at(0, 0).view(), Rect::from_tlwh(75, 75, 10, 10)),
            Err(TrackError::OutOfFrame { .. })
        ));
    }

    #[test]
    fn test_update_before_init_fails() {
        let mut tracker = TemplateTracker::default();
        assert_eq!(tracker.update(square_at(0, 0).view()), Err(TrackError::NotInitialized));
    }

    #[test]
    fn test_double_init_is_rejected() {
        let frame = square_at(30, 30);
        let mut tracker = TemplateTracker::default();
        tracker
            .init(frame.view(), Rect::from_tlwh(30, 30, 10, 10))
            .unwrap();
        assert_eq!(
            tracker.init(frame.view(), Rect::from_tlwh(30, 30, 10, 10)),
            Err(TrackError::AlreadyInitialized)
        );
    }
}
