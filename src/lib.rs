//! Kernelized correlation filter (CSK) visual tracking.
//!
//! A [`CskTracker`] learns a frequency-domain appearance filter for one target
//! and follows it frame to frame. A [`MultiTracker`] owns one independent
//! tracker per target and dispatches every frame to all of them, either in
//! order on the calling thread or concurrently, always returning results in
//! target order.
//!
//! ```ignore
//! use csktrack_rs::{CskTracker, DispatchMode, MultiTracker, Rect};
//!
//! let mut multi = MultiTracker::new(CskTracker::default, DispatchMode::Concurrent);
//! multi.init(first.view(), &[Rect::from_tlbr(10, 10, 60, 60)])?;
//! for frame in frames {
//!     let boxes = multi.update_all(frame.view())?;
//! }
//! ```

pub mod error;
pub mod integration;
pub mod rect;
pub mod signal;
pub mod tracker;

pub use error::{Result, TrackError};
pub use integration::{
    FrameSource, PipelineError, RectBuilder, Seed, SeedSource, TrackerPipeline, frame_from_luma,
};
pub use rect::{CropBounds, Rect};
pub use tracker::{
    CskConfig, CskTracker, DispatchMode, Frame, FrameView, MultiTracker, TargetState,
    TemplateTracker, TrackState, Tracker, TrackerPool,
};
