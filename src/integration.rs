//! Integration module for connecting frame producers and detectors with the trackers.
//!
//! Frame acquisition and detection stay outside the crate; this module only
//! defines the traits they implement and a driver that seeds targets from
//! detections and follows them with a multi-target tracker.

mod builder;
mod detector;
mod pipeline;

pub use builder::RectBuilder;
pub use detector::{FrameSource, Seed, SeedSource, frame_from_luma};
pub use pipeline::{PipelineError, TrackerPipeline};
