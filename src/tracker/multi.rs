//! Multi-target dispatcher over independent single-target trackers.

use std::fmt;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TrackError};
use crate::rect::Rect;
use crate::tracker::capability::{FrameView, Tracker};

/// How `MultiTracker::update` fans a frame out to its trackers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DispatchMode {
    /// Index order on the calling thread
    #[default]
    Sequential,
    /// One rayon task per target, joined before returning
    Concurrent,
}

/// Owns one tracker per target and runs them all against each frame.
///
/// Trackers share nothing but the read-only frame, so concurrent dispatch
/// needs no locking. Results always come back in the order of the boxes
/// given to [`MultiTracker::init`].
pub struct MultiTracker<T: Tracker> {
    factory: Box<dyn Fn() -> T + Send + Sync>,
    mode: DispatchMode,
    trackers: Vec<T>,
    initialized: bool,
}

impl<T: Tracker> fmt::Debug for MultiTracker<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiTracker")
            .field("mode", &self.mode)
            .field("targets", &self.trackers.len())
            .field("initialized", &self.initialized)
            .finish()
    }
}

impl<T: Tracker> MultiTracker<T> {
    /// Create a dispatcher that builds a fresh tracker per target with `factory`.
    pub fn new<F>(factory: F, mode: DispatchMode) -> Self
    where
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            mode,
            trackers: Vec::new(),
            initialized: false,
        }
    }

    pub fn mode(&self) -> DispatchMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: DispatchMode) {
        self.mode = mode;
    }

    pub fn len(&self) -> usize {
        self.trackers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trackers.is_empty()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Trackers in target order.
    pub fn trackers(&self) -> &[T] {
        &self.trackers
    }

    /// Seed one tracker per box. Valid exactly once.
    ///
    /// If any seed fails, no tracker is kept and the error names the target.
    pub fn init(&mut self, frame: FrameView<'_>, rects: &[Rect]) -> Result<()> {
        if self.initialized {
            return Err(TrackError::AlreadyInitialized);
        }

        let mut trackers = Vec::with_capacity(rects.len());
        for (index, rect) in rects.iter().enumerate() {
            let mut tracker = (self.factory)();
            tracker
                .init(frame, *rect)
                .map_err(|err| TrackError::for_target(index, err))?;
            trackers.push(tracker);
        }

        debug!(targets = trackers.len(), mode = ?self.mode, "multi tracker initialized");
        self.trackers = trackers;
        self.initialized = true;
        Ok(())
    }

    /// Update every target, isolating failures per target.
    ///
    /// Slot `i` holds the outcome for the `i`-th box given to `init`. A failing
    /// target never blocks or alters the others.
    pub fn update(&mut self, frame: FrameView<'_>) -> Result<Vec<Result<Rect>>> {
        if !self.initialized {
            return Err(TrackError::NotInitialized);
        }

        let results: Vec<Result<Rect>> = match self.mode {
            DispatchMode::Sequential => self
                .trackers
                .iter_mut()
                .map(|tracker| tracker.update(frame))
                .collect(),
            DispatchMode::Concurrent => self
                .trackers
                .par_iter_mut()
                .map(|tracker| tracker.update(frame))
                .collect(),
        };

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(failed, targets = results.len(), "multi tracker update had failures");
        }
        Ok(results)
    }

    /// Update every target, aborting with the first failure by target index.
    pub fn update_all(&mut self, frame: FrameView<'_>) -> Result<Vec<Rect>> {
        self.update(frame)?
            .into_iter()
            .enumerate()
            .map(|(index, result)| result.map_err(|err| TrackError::for_target(index, err)))
            .collect()
    }
}
