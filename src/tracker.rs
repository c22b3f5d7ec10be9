mod capability;
mod csk;
mod multi;
mod pool;
mod target;
mod template;
mod track_state;

pub use capability::{Frame, FrameView, Tracker};
pub use csk::{CskConfig, CskTracker};
pub use multi::{DispatchMode, MultiTracker};
pub use pool::TrackerPool;
pub use target::TargetState;
pub use template::TemplateTracker;
pub use track_state::TrackState;
