use ndarray::{Array2, ArrayView2};

use crate::error::Result;
use crate::rect::Rect;
use crate::tracker::track_state::TrackState;

/// Owned single-channel 8-bit frame, indexed `[row, col]`.
pub type Frame = Array2<u8>;

/// Borrowed view of a [`Frame`], shared read-only across workers.
pub type FrameView<'a> = ArrayView2<'a, u8>;

/// Contract every single-target tracking strategy satisfies.
///
/// The multi-target layer is written once against this trait, so correlation
/// filters, template matchers and any other strategy plug in the same way.
///
/// # Example
///
/// ```ignore
/// use csktrack_rs::{FrameView, Rect, Result, TrackState, Tracker};
///
/// struct Stationary(Option<Rect>);
///
/// impl Tracker for Stationary {
///     fn init(&mut self, _frame: FrameView<'_>, rect: Rect) -> Result<()> {
///         self.0 = Some(rect);
///         Ok(())
///     }
///
///     fn update(&mut self, _frame: FrameView<'_>) -> Result<Rect> {
///         self.0.ok_or(csktrack_rs::TrackError::NotInitialized)
///     }
///
///     fn state(&self) -> TrackState {
///         if self.0.is_some() { TrackState::Tracking } else { TrackState::Uninitialized }
///     }
/// }
/// ```
pub trait Tracker: Send {
    /// Learn the target's appearance inside `rect` on `frame`.
    ///
    /// Valid exactly once per instance.
    fn init(&mut self, frame: FrameView<'_>, rect: Rect) -> Result<()>;

    /// Locate the target on the next frame and return its new box.
    fn update(&mut self, frame: FrameView<'_>) -> Result<Rect>;

    /// Current lifecycle state.
    fn state(&self) -> TrackState;

    /// Short identifier used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}
