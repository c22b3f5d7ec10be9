/// Lifecycle of a single-target tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TrackState {
    /// Created, waiting for `init`
    #[default]
    Uninitialized,
    /// Model trained, accepting `update`
    Tracking,
    /// An update failed irrecoverably; the tracker must be discarded
    Lost,
}

impl TrackState {
    #[inline]
    pub fn is_tracking(&self) -> bool {
        matches!(self, Self::Tracking)
    }
}
