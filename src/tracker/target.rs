//! Learned per-target model of the correlation tracker.

use ndarray::Array2;
use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::rect::Rect;

/// Everything one correlation tracker knows about its target.
///
/// The four fields change together: an update builds a complete replacement
/// and swaps it in only once every step has succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetState {
    /// Box returned by the last successful `init` or `update`
    pub previous_box: Rect,
    /// Frequency-domain correlation filter, shape `(2h, 2w)`
    pub appearance_filter: Array2<Complex64>,
    /// Windowed patch the filter was trained against, shape `(2h, 2w)`
    pub reference_patch: Array2<f64>,
    /// Response peak `(row, col)` at the last (re)training
    pub previous_peak_location: (usize, usize),
}

impl TargetState {
    /// Shape shared by the filter and the reference patch.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        self.reference_patch.dim()
    }

    /// Whether the learned model contains only finite values.
    pub fn is_finite(&self) -> bool {
        self.reference_patch.iter().all(|v| v.is_finite())
            && self
                .appearance_filter
                .iter()
                .all(|c| c.re.is_finite() && c.im.is_finite())
    }
}
