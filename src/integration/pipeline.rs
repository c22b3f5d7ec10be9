//! TrackerPipeline for seeding trackers from a detector and following them.

use std::fmt;

use thiserror::Error;
use tracing::{debug, info};

use crate::error::TrackError;
use crate::rect::Rect;
use crate::tracker::{FrameView, MultiTracker, Tracker};

use super::{FrameSource, SeedSource};

/// Failure of one pipeline step.
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("detection failed: {0}")]
    Detect(E),
    #[error("frame source failed: {0}")]
    Source(String),
    #[error(transparent)]
    Track(#[from] TrackError),
}

/// Detect-then-track driver.
///
/// The first processed frame goes to the seed source; every detection at or
/// above the score threshold becomes a target of the multi-target tracker.
/// Every later frame only updates the trackers.
pub struct TrackerPipeline<S: SeedSource, T: Tracker> {
    seeds: S,
    tracker: MultiTracker<T>,
    min_score: f32,
    frame_id: u64,
}

impl<S: SeedSource, T: Tracker> fmt::Debug for TrackerPipeline<S, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerPipeline")
            .field("tracker", &self.tracker)
            .field("min_score", &self.min_score)
            .field("frame_id", &self.frame_id)
            .finish()
    }
}

impl<S: SeedSource, T: Tracker> TrackerPipeline<S, T> {
    /// Create a new pipeline from a seed source and an uninitialized multi tracker.
    pub fn new(seeds: S, tracker: MultiTracker<T>) -> Self {
        Self {
            seeds,
            tracker,
            min_score: 0.5,
            frame_id: 0,
        }
    }

    /// Set the minimum detection score for a seed to become a target.
    pub fn with_min_score(mut self, min_score: f32) -> Self {
        self.min_score = min_score;
        self
    }

    /// Process a single frame and return one outcome per target.
    ///
    /// On the seeding frame the outcomes are the accepted seed boxes.
    pub fn process_frame(
        &mut self,
        frame: FrameView<'_>,
    ) -> Result<Vec<Result<Rect, TrackError>>, PipelineError<S::Error>> {
        self.frame_id += 1;

        if self.tracker.is_initialized() {
            return Ok(self.tracker.update(frame)?);
        }

        let rects: Vec<Rect> = self
            .seeds
            .detect(frame)
            .map_err(PipelineError::Detect)?
            .into_iter()
            .filter(|seed| seed.score >= self.min_score)
            .map(|seed| seed.rect)
            .collect();
        self.tracker.init(frame, &rects)?;
        info!(
            frame_id = self.frame_id,
            targets = rects.len(),
            "pipeline seeded"
        );
        Ok(rects.into_iter().map(Ok).collect())
    }

    /// Drain `frames`, handing each frame's outcomes to `sink`.
    ///
    /// Returns the number of frames processed.
    pub fn run<F>(
        &mut self,
        frames: &mut F,
        mut sink: impl FnMut(u64, Vec<Result<Rect, TrackError>>),
    ) -> Result<u64, PipelineError<S::Error>>
    where
        F: FrameSource,
        F::Error: fmt::Display,
    {
        let mut processed = 0;
        while let Some(frame) = frames
            .next_frame()
            .map_err(|err| PipelineError::Source(err.to_string()))?
        {
            let results = self.process_frame(frame.view())?;
            sink(self.frame_id, results);
            processed += 1;
        }
        debug!(processed, "pipeline stream finished");
        Ok(processed)
    }

    /// Get a reference to the underlying seed source.
    pub fn seeds(&self) -> &S {
        &self.seeds
    }

    /// Get a mutable reference to the underlying seed source.
    pub fn seeds_mut(&mut self) -> &mut S {
        &mut self.seeds
    }

    /// Get a reference to the underlying multi tracker.
    pub fn tracker(&self) -> &MultiTracker<T> {
        &self.tracker
    }

    /// Get a mutable reference to the underlying multi tracker.
    pub fn tracker_mut(&mut self) -> &mut MultiTracker<T> {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integration::Seed;
    use crate::tracker::{DispatchMode, Frame, TemplateTracker};
    use ndarray::Array2;

    struct MockDetector {
        seeds: Vec<Seed>,
        calls: usize,
    }

    impl SeedSource for MockDetector {
        type Error = std::convert::Infallible;

        fn detect(&mut self, _frame: FrameView<'_>) -> Result<Vec<Seed>, Self::Error> {
            self.calls += 1;
            Ok(self.seeds.clone())
        }
    }

    fn square_at(x: usize) -> Frame {
        Array2::from_shape_fn((40, 80), |(r, c)| {
            if (10..20).contains(&r) && (x..x + 10).contains(&c) {
                150 + (c - x) as u8 * 10
            } else {
                5
            }
        })
    }

    #[test]
    fn test_tracker_pipeline() {
        let detector = MockDetector {
            seeds: vec![
                Seed::new(Rect::from_tlwh(20, 10, 10, 10), 0.9),
                Seed::new(Rect::from_tlwh(50, 10, 10, 10), 0.1),
            ],
            calls: 0,
        };
        let tracker = MultiTracker::new(|| TemplateTracker::new(5), DispatchMode::Sequential);
        let mut pipeline = TrackerPipeline::new(detector, tracker);

        let seeded = pipeline.process_frame(square_at(20).view()).unwrap();
        assert_eq!(seeded, vec![Ok(Rect::from_tlwh(20, 10, 10, 10))]);

        let tracked = pipeline.process_frame(square_at(23).view()).unwrap();
        assert_eq!(tracked, vec![Ok(Rect::from_tlwh(23, 10, 10, 10))]);
        assert_eq!(pipeline.seeds().calls, 1);
    }

    #[test]
    fn test_run_drains_frame_source() {
        let detector = MockDetector {
            seeds: vec![Seed::new(Rect::from_tlwh(20, 10, 10, 10), 0.9)],
            calls: 0,
        };
        let tracker = MultiTracker::new(|| TemplateTracker::new(5), DispatchMode::Concurrent);
        let mut pipeline = TrackerPipeline::new(detector, tracker).with_min_score(0.3);

        let mut frames = vec![square_at(20), square_at(22), square_at(24)].into_iter();
        let mut history = Vec::new();
        let processed = pipeline
            .run(&mut frames, |frame_id, results| history.push((frame_id, results)))
            .unwrap();

        assert_eq!(processed, 3);
        assert_eq!(history.len(), 3);
        assert_eq!(history[2].0, 3);
        assert_eq!(history[2].1, vec![Ok(Rect::from_tlwh(24, 10, 10, 10))]);
    }
}
