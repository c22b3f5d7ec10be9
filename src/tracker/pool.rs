//! Persistent worker pool: one long-lived thread and job channel per target.
//!
//! Trades thread startup per frame for an explicit lifecycle. Dropping the pool
//! closes every job channel and joins every worker.

use std::fmt;
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{Receiver, Sender, bounded};
use tracing::{debug, trace, warn};

use crate::error::{Result, TrackError};
use crate::rect::Rect;
use crate::tracker::capability::{Frame, Tracker};

struct Worker {
    job_tx: Option<Sender<Arc<Frame>>>,
    result_rx: Receiver<Result<Rect>>,
    handle: Option<thread::JoinHandle<()>>,
}

/// Trackers pinned to dedicated threads, fed one shared frame per update.
///
/// Updates take `&mut self`: one round of sends and receives must finish
/// before the next starts, or results would reach the wrong caller.
pub struct TrackerPool {
    workers: Vec<Worker>,
}

impl fmt::Debug for TrackerPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TrackerPool")
            .field("targets", &self.workers.len())
            .finish()
    }
}

impl TrackerPool {
    /// Initialize one tracker per box on `frame`, then move each onto its own thread.
    pub fn spawn<T, F>(factory: F, frame: &Frame, rects: &[Rect]) -> Result<Self>
    where
        T: Tracker + 'static,
        F: Fn() -> T,
    {
        let mut trackers = Vec::with_capacity(rects.len());
        for (index, rect) in rects.iter().enumerate() {
            let mut tracker = factory();
            tracker
                .init(frame.view(), *rect)
                .map_err(|err| TrackError::for_target(index, err))?;
            trackers.push(tracker);
        }

        let mut pool = Self {
            workers: Vec::with_capacity(trackers.len()),
        };
        for (index, mut tracker) in trackers.into_iter().enumerate() {
            let (job_tx, job_rx) = bounded::<Arc<Frame>>(1);
            let (result_tx, result_rx) = bounded::<Result<Rect>>(1);

            let handle = thread::Builder::new()
                .name(format!("tracker-{index}"))
                .spawn(move || {
                    trace!(index, tracker = tracker.name(), "tracker worker started");
                    while let Ok(frame) = job_rx.recv() {
                        let result = tracker.update(frame.view());
                        if result_tx.send(result).is_err() {
                            break;
                        }
                    }
                    trace!(index, "tracker worker stopped");
                })
                .map_err(|err| TrackError::WorkerSpawn {
                    index,
                    reason: err.to_string(),
                })?;

            pool.workers.push(Worker {
                job_tx: Some(job_tx),
                result_rx,
                handle: Some(handle),
            });
        }

        debug!(targets = pool.workers.len(), "tracker pool spawned");
        Ok(pool)
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Send `frame` to every worker, then wait for all of them.
    ///
    /// Slot `i` holds the outcome for the `i`-th box given to `spawn`.
    pub fn update(&mut self, frame: Arc<Frame>) -> Vec<Result<Rect>> {
        let sent: Vec<bool> = self
            .workers
            .iter()
            .map(|worker| {
                worker
                    .job_tx
                    .as_ref()
                    .is_some_and(|tx| tx.send(Arc::clone(&frame)).is_ok())
            })
            .collect();

        let results: Vec<Result<Rect>> = self
            .workers
            .iter()
            .zip(sent)
            .enumerate()
            .map(|(index, (worker, sent))| {
                if !sent {
                    return Err(TrackError::WorkerDisconnected(index));
                }
                worker
                    .result_rx
                    .recv()
                    .unwrap_or(Err(TrackError::WorkerDisconnected(index)))
            })
            .collect();

        let failed = results.iter().filter(|r| r.is_err()).count();
        if failed > 0 {
            warn!(failed, targets = results.len(), "tracker pool update had failures");
        }
        results
    }

    /// Update every target, aborting with the first failure by target index.
    pub fn update_all(&mut self, frame: Arc<Frame>) -> Result<Vec<Rect>> {
        self.update(frame)
            .into_iter()
            .enumerate()
            .map(|(index, result)| result.map_err(|err| TrackError::for_target(index, err)))
            .collect()
    }

    /// Close every job channel and join the workers.
    pub fn shutdown(mut self) {
        self.close();
    }

    fn close(&mut self) {
        for worker in &mut self.workers {
            worker.job_tx.take();
        }
        for (index, worker) in self.workers.iter_mut().enumerate() {
            if let Some(handle) = worker.handle.take()
                && handle.join().is_err()
            {
                warn!(index, "tracker worker panicked");
            }
        }
    }
}

impl Drop for TrackerPool {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::tracker::capability::FrameView;
    use crate::tracker::template::TemplateTracker;
    use crate::tracker::track_state::TrackState;
    use ndarray::Array2;

    fn squares(offset: usize) -> Frame {
        Array2::from_shape_fn((60, 120), |(r, c)| {
            let in_a = (20..30).contains(&r) && (10 + offset..20 + offset).contains(&c);
            let in_b = (20..30).contains(&r) && (70 + offset..80 + offset).contains(&c);
            if in_a {
                220 - (c - 10 - offset) as u8 * 3
            } else if in_b {
                100 + (r - 20) as u8 * 9
            } else {
                0
            }
        })
    }

    #[test]
    fn test_pool_tracks_in_order() {
        let rects = [Rect::from_tlwh(10, 20, 10, 10), Rect::from_tlwh(70, 20, 10, 10)];
        let mut pool = TrackerPool::spawn(|| TemplateTracker::new(6), &squares(0), &rects).unwrap();
        assert_eq!(pool.len(), 2);

        let moved = pool.update_all(Arc::new(squares(3))).unwrap();
        assert_eq!(
            moved,
            vec![Rect::from_tlwh(13, 20, 10, 10), Rect::from_tlwh(73, 20, 10, 10)]
        );
        pool.shutdown();
    }

    #[test]
    fn test_spawn_reports_failing_seed() {
        let rects = [Rect::from_tlwh(10, 20, 10, 10), Rect::from_tlwh(0, 0, 0, 4)];
        let err = TrackerPool::spawn(TemplateTracker::default, &squares(0), &rects).unwrap_err();
        assert!(matches!(err, TrackError::Target { index: 1, .. }));
    }

    #[test]
    fn test_empty_pool() {
        let mut pool = TrackerPool::spawn(TemplateTracker::default, &squares(0), &[]).unwrap();
        assert!(pool.is_empty());
        assert!(pool.update(Arc::new(squares(0))).is_empty());
    }

    /// Reports the top-left pixel of each frame as its box origin.
    struct FrameTag {
        state: TrackState,
    }

    impl Tracker for FrameTag {
        fn init(&mut self, _frame: FrameView<'_>, _rect: Rect) -> Result<()> {
            self.state = TrackState::Tracking;
            Ok(())
        }

        fn update(&mut self, frame: FrameView<'_>) -> Result<Rect> {
            let tag = i32::from(frame[[0, 0]]);
            Ok(Rect::from_tlwh(tag, tag, 1, 1))
        }

        fn state(&self) -> TrackState {
            self.state
        }
    }

    #[test]
    fn test_shared_pool_returns_each_caller_its_own_results() {
        let rects = [Rect::from_tlwh(0, 0, 1, 1); 3];
        let factory = || FrameTag {
            state: TrackState::Uninitialized,
        };
        let pool = TrackerPool::spawn(factory, &Array2::zeros((2, 2)), &rects).unwrap();
        let pool = Arc::new(Mutex::new(pool));

        let callers: Vec<_> = (1..=4u8)
            .map(|tag| {
                let pool = Arc::clone(&pool);
                thread::spawn(move || {
                    let frame = Arc::new(Array2::from_elem((2, 2), tag));
                    for _ in 0..100 {
                        let boxes = pool.lock().unwrap().update_all(Arc::clone(&frame)).unwrap();
                        let expected = Rect::from_tlwh(tag as i32, tag as i32, 1, 1);
                        assert!(boxes.iter().all(|b| *b == expected), "{boxes:?} for tag {tag}");
                    }
                })
            })
            .collect();
        for caller in callers {
            caller.join().unwrap();
        }
    }

    #[test]
    fn test_debug_reports_target_count() {
        let pool = TrackerPool::spawn(TemplateTracker::default, &squares(0), &[]).unwrap();
        assert_eq!(format!("{pool:?}"), "TrackerPool { targets: 0 }");
    }
}
