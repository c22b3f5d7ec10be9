use thiserror::Error;

/// Errors raised by the correlation trackers and the multi-target dispatcher.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TrackError {
    #[error("tracker used before init")]
    NotInitialized,
    #[error("tracker already initialized")]
    AlreadyInitialized,
    #[error("degenerate box ({x1}, {y1}, {x2}, {y2}): width and height must be positive")]
    DegenerateBox { x1: i32, y1: i32, x2: i32, y2: i32 },
    #[error("box ({x1}, {y1}, {x2}, {y2}) lies outside the {width}x{height} frame")]
    OutOfFrame {
        x1: i32,
        y1: i32,
        x2: i32,
        y2: i32,
        width: usize,
        height: usize,
    },
    #[error("box ({x1}, {y1}, {x2}, {y2}) is too large to track")]
    OversizedBox { x1: i32, y1: i32, x2: i32, y2: i32 },
    #[error("frame has no pixels")]
    EmptyFrame,
    #[error("invalid frame: expected {expected} bytes, got {got}")]
    InvalidFrame { expected: usize, got: usize },
    #[error("shape mismatch: {left:?} vs {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
    #[error("non-finite values in {0}")]
    NumericDegeneracy(&'static str),
    #[error("response confidence too low: psr {psr:.3} < {min_psr:.3}")]
    LowConfidence { psr: f64, min_psr: f64 },
    #[error("target lost")]
    TargetLost,
    #[error("invalid config: {0}")]
    InvalidConfig(String),
    #[error("target {index}: {source}")]
    Target {
        index: usize,
        #[source]
        source: Box<TrackError>,
    },
    #[error("worker for target {0} disconnected")]
    WorkerDisconnected(usize),
    #[error("failed to spawn worker for target {index}: {reason}")]
    WorkerSpawn { index: usize, reason: String },
}

impl TrackError {
    /// Wrap an error with the index of the target it belongs to.
    pub fn for_target(index: usize, source: TrackError) -> Self {
        Self::Target {
            index,
            source: Box::new(source),
        }
    }

    /// Whether the error leaves the tracker permanently unusable.
    pub fn is_target_lost(&self) -> bool {
        match self {
            Self::OutOfFrame { .. }
            | Self::OversizedBox { .. }
            | Self::NumericDegeneracy(_)
            | Self::LowConfidence { .. }
            | Self::TargetLost => true,
            Self::Target { source, .. } => source.is_target_lost(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, TrackError>;
