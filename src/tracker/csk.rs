//! Kernelized correlation filter tracker with circulant structure (CSK).

use ndarray::{Array2, Zip};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, TrackError};
use crate::rect::Rect;
use crate::signal::{
    Fft2, build_target_response, crop_region, dense_gaussian_kernel_with, max_response_location,
    peak_to_sidelobe_ratio,
};
use crate::tracker::capability::{FrameView, Tracker};
use crate::tracker::target::TargetState;
use crate::tracker::track_state::TrackState;

/// Configuration for the [`CskTracker`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CskConfig {
    /// Bandwidth of the Gaussian kernel
    pub sigma: f64,
    /// Regularization added to the kernel spectrum before division
    pub lambda: f64,
    /// Exponential moving average rate for the patch and the filter
    pub learning_rate: f64,
    /// Minimum peak-to-sidelobe ratio accepted from a response, if any
    pub min_psr: Option<f64>,
}

impl Default for CskConfig {
    fn default() -> Self {
        Self {
            sigma: 0.2,
            lambda: 1e-2,
            learning_rate: 0.075,
            min_psr: None,
        }
    }
}

impl CskConfig {
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }

    pub fn with_lambda(mut self, lambda: f64) -> Self {
        self.lambda = lambda;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_min_psr(mut self, min_psr: f64) -> Self {
        self.min_psr = Some(min_psr);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.sigma.is_finite() && self.sigma > 0.0) {
            return Err(TrackError::InvalidConfig(format!(
                "sigma must be positive, got {}",
                self.sigma
            )));
        }
        if !(self.lambda.is_finite() && self.lambda > 0.0) {
            return Err(TrackError::InvalidConfig(format!(
                "lambda must be positive, got {}",
                self.lambda
            )));
        }
        if !(0.0..=1.0).contains(&self.learning_rate) {
            return Err(TrackError::InvalidConfig(format!(
                "learning_rate must be within [0, 1], got {}",
                self.learning_rate
            )));
        }
        if let Some(min_psr) = self.min_psr
            && !min_psr.is_finite()
        {
            return Err(TrackError::InvalidConfig(format!(
                "min_psr must be finite, got {min_psr}"
            )));
        }
        Ok(())
    }
}

/// Plans and training target fixed at init for one patch shape.
#[derive(Debug, Clone)]
struct Model {
    fft: Fft2,
    target_spectrum: Array2<Complex64>,
}

/// Single-target CSK tracker.
///
/// `init` trains a frequency-domain filter on the patch around the seed box;
/// every `update` correlates the filter with the patch at the previous box,
/// moves the box by the response peak displacement and blends a filter
/// retrained at the new position into the model.
#[derive(Debug, Clone)]
pub struct CskTracker {
    config: CskConfig,
    state: TrackState,
    model: Option<Model>,
    target: Option<TargetState>,
    last_psr: Option<f64>,
}

impl Default for CskTracker {
    fn default() -> Self {
        Self::new(CskConfig::default())
    }
}

impl CskTracker {
    pub fn new(config: CskConfig) -> Self {
        Self {
            config,
            state: TrackState::Uninitialized,
            model: None,
            target: None,
            last_psr: None,
        }
    }

    pub fn config(&self) -> &CskConfig {
        &self.config
    }

    /// Learned model, present once `init` has succeeded.
    pub fn target(&self) -> Option<&TargetState> {
        self.target.as_ref()
    }

    /// Peak-to-sidelobe ratio of the last evaluated response.
    pub fn last_psr(&self) -> Option<f64> {
        self.last_psr
    }

    /// `FFT(y) / (FFT(k(patch, patch)) + lambda)`.
    fn train(&self, model: &Model, patch: &Array2<f64>) -> Result<Array2<Complex64>> {
        let kernel =
            dense_gaussian_kernel_with(&model.fft, patch.view(), patch.view(), self.config.sigma)?;
        let mut filter = model.fft.forward_real(kernel.view());
        let lambda = self.config.lambda;
        Zip::from(&mut filter)
            .and(&model.target_spectrum)
            .for_each(|f, &y| *f = y / (*f + lambda));
        if filter.iter().any(|c| !(c.re.is_finite() && c.im.is_finite())) {
            return Err(TrackError::NumericDegeneracy("appearance filter"));
        }
        Ok(filter)
    }

    /// Run one detect and adapt cycle without touching `self.target`.
    fn step(&self, frame: FrameView<'_>) -> Result<(TargetState, f64)> {
        let (Some(model), Some(target)) = (&self.model, &self.target) else {
            return Err(TrackError::NotInitialized);
        };
        let sigma = self.config.sigma;

        let candidate = crop_region(frame, &target.previous_box)?;
        let kernel = dense_gaussian_kernel_with(
            &model.fft,
            target.reference_patch.view(),
            candidate.view(),
            sigma,
        )?;

        let mut spectrum = model.fft.forward_real(kernel.view());
        Zip::from(&mut spectrum)
            .and(&target.appearance_filter)
            .for_each(|k, &f| *k *= f);
        model.fft.inverse(&mut spectrum);
        let response = spectrum.mapv(|c| c.re);
        if response.iter().any(|v| !v.is_finite()) {
            return Err(TrackError::NumericDegeneracy("response"));
        }

        let psr = peak_to_sidelobe_ratio(response.view());
        if let Some(min_psr) = self.config.min_psr
            && psr < min_psr
        {
            return Err(TrackError::LowConfidence { psr, min_psr });
        }

        let peak = max_response_location(response.view());
        let (ref_row, ref_col) = target.previous_peak_location;
        let dy = peak.0 as i32 - ref_row as i32;
        let dx = peak.1 as i32 - ref_col as i32;
        let next_box = target.previous_box.translate(-dx, -dy);
        debug!(
            peak = ?peak,
            dx = -dx,
            dy = -dy,
            psr,
            "csk response peak"
        );

        let new_patch = crop_region(frame, &next_box)?;
        let filter_update = self.train(model, &new_patch)?;

        let eta = self.config.learning_rate;
        let mut reference_patch = target.reference_patch.clone();
        Zip::from(&mut reference_patch)
            .and(&new_patch)
            .for_each(|r, &n| *r = eta * n + (1.0 - eta) * *r);
        let mut appearance_filter = target.appearance_filter.clone();
        Zip::from(&mut appearance_filter)
            .and(&filter_update)
            .for_each(|f, &u| *f = u * eta + *f * (1.0 - eta));

        let next = TargetState {
            previous_box: next_box,
            appearance_filter,
            reference_patch,
            // Retraining recenters the target, so the reference peak stays at
            // the center of the training response.
            previous_peak_location: target.previous_peak_location,
        };
        if !next.is_finite() {
            return Err(TrackError::NumericDegeneracy("adapted model"));
        }
        Ok((next, psr))
    }
}

impl Tracker for CskTracker {
    fn init(&mut self, frame: FrameView<'_>, rect: Rect) -> Result<()> {
        if self.state != TrackState::Uninitialized {
            return Err(TrackError::AlreadyInitialized);
        }
        self.config.validate()?;
        let rect = rect.validated()?;

        let patch = crop_region(frame, &rect)?;
        let (height, width) = (rect.height() as usize, rect.width() as usize);
        let target_response = build_target_response(height, width);
        let fft = Fft2::new(2 * height, 2 * width);
        let model = Model {
            target_spectrum: fft.forward_real(target_response.view()),
            fft,
        };
        let appearance_filter = self.train(&model, &patch)?;

        debug!(
            rect = ?rect.to_tlbr(),
            patch = ?patch.dim(),
            "csk tracker initialized"
        );

        self.target = Some(TargetState {
            previous_box: rect,
            appearance_filter,
            reference_patch: patch,
            previous_peak_location: max_response_location(target_response.view()),
        });
        self.model = Some(model);
        self.state = TrackState::Tracking;
        Ok(())
    }

    fn update(&mut self, frame: FrameView<'_>) -> Result<Rect> {
        match self.state {
            TrackState::Uninitialized => return Err(TrackError::NotInitialized),
            TrackState::Lost => return Err(TrackError::TargetLost),
            TrackState::Tracking => {}
        }

        match self.step(frame) {
            Ok((next, psr)) => {
                let rect = next.previous_box;
                self.target = Some(next);
                self.last_psr = Some(psr);
                Ok(rect)
            }
            Err(err) => {
                if err.is_target_lost() {
                    warn!(error = %err, "csk target lost");
                    self.state = TrackState::Lost;
                }
                Err(err)
            }
        }
    }

    fn state(&self) -> TrackState {
        self.state
    }

    fn name(&self) -> &'static str {
        "csk"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn noise_frame(height: usize, width: usize) -> Array2<u8> {
        Array2::from_shape_fn((height, width), |(y, x)| {
            let mut z = ((y as u64) << 32 | x as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
            z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
            z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
            ((z ^ (z >> 31)) >> 56) as u8
        })
    }

    #[test]
    fn test_update_before_init_fails() {
        let frame = noise_frame(64, 64);
        let mut tracker = CskTracker::default();
        assert_eq!(tracker.update(frame.view()), Err(TrackError::NotInitialized));
        assert_eq!(tracker.state(), TrackState::Uninitialized);
    }

    #[test]
    fn test_double_init_is_rejected() {
        let frame = noise_frame(64, 64);
        let mut tracker = CskTracker::default();
        tracker
            .init(frame.view(), Rect::from_tlbr(20, 20, 40, 40))
            .unwrap();
        assert_eq!(
            tracker.init(frame.view(), Rect::from_tlbr(10, 10, 30, 30)),
            Err(TrackError::AlreadyInitialized)
        );
        assert_eq!(
            tracker.target().unwrap().previous_box,
            Rect::from_tlbr(20, 20, 40, 40)
        );
    }

    #[test]
    fn test_init_rejects_degenerate_box() {
        let frame = noise_frame(64, 64);
        let mut tracker = CskTracker::default();
        assert!(matches!(
            tracker.init(frame.view(), Rect::from_tlbr(20, 20, 20, 40)),
            Err(TrackError::DegenerateBox { .. })
        ));
        assert_eq!(tracker.state(), TrackState::Uninitialized);
    }

    #[test]
    fn test_init_rejects_invalid_config() {
        let frame = noise_frame(64, 64);
        let mut tracker = CskTracker::new(CskConfig::default().with_learning_rate(1.5));
        assert!(matches!(
            tracker.init(frame.view(), Rect::from_tlbr(20, 20, 40, 40)),
            Err(TrackError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_init_stores_centered_peak_and_shapes() {
        let frame = noise_frame(100, 100);
        let mut tracker = CskTracker::default();
        tracker
            .init(frame.view(), Rect::from_tlbr(30, 40, 54, 60))
            .unwrap();
        let target = tracker.target().unwrap();
        assert_eq!(target.shape(), (40, 48));
        assert_eq!(target.appearance_filter.dim(), (40, 48));
        assert_eq!(target.previous_peak_location, (20, 24));
        assert!(target.is_finite());
    }

    #[test]
    fn test_frame_change_shape_does_not_change_model_shape() {
        let frame = noise_frame(100, 100);
        let mut tracker = CskTracker::default();
        tracker
            .init(frame.view(), Rect::from_tlbr(30, 30, 50, 60))
            .unwrap();
        let larger = noise_frame(120, 140);
        tracker.update(larger.view()).unwrap();
        assert_eq!(tracker.target().unwrap().shape(), (60, 40));
    }

    #[test]
    fn test_target_leaving_frame_is_lost() {
        let frame = noise_frame(100, 100);
        let mut tracker = CskTracker::default();
        tracker
            .init(frame.view(), Rect::from_tlbr(10, 10, 30, 30))
            .unwrap();
        let tiny = noise_frame(5, 5);
        assert!(matches!(
            tracker.update(tiny.view()),
            Err(TrackError::OutOfFrame { .. })
        ));
        assert_eq!(tracker.state(), TrackState::Lost);
        assert_eq!(tracker.update(frame.view()), Err(TrackError::TargetLost));
        // The failed update committed nothing.
        assert_eq!(
            tracker.target().unwrap().previous_box,
            Rect::from_tlbr(10, 10, 30, 30)
        );
    }

    #[test]
    fn test_empty_frame_keeps_tracking() {
        let frame = noise_frame(100, 100);
        let mut tracker = CskTracker::default();
        tracker
            .init(frame.view(), Rect::from_tlbr(10, 10, 30, 30))
            .unwrap();
        let empty = Array2::<u8>::zeros((0, 0));
        assert_eq!(tracker.update(empty.view()), Err(TrackError::EmptyFrame));
        assert_eq!(tracker.state(), TrackState::Tracking);
        assert!(tracker.update(frame.view()).is_ok());
    }

    #[test]
    fn test_min_psr_marks_target_lost() {
        let frame = noise_frame(100, 100);
        let mut tracker = CskTracker::new(CskConfig::default().with_min_psr(f64::MAX));
        tracker
            .init(frame.view(), Rect::from_tlbr(30, 30, 60, 60))
            .unwrap();
        assert!(matches!(
            tracker.update(frame.view()),
            Err(TrackError::LowConfidence { .. })
        ));
        assert_eq!(tracker.state(), TrackState::Lost);
    }

    #[test]
    fn test_static_noise_does_not_drift() {
        let frame = noise_frame(120, 120);
        let rect = Rect::from_tlbr(40, 45, 72, 75);
        let mut tracker = CskTracker::default();
        tracker.init(frame.view(), rect).unwrap();
        for _ in 0..5 {
            assert_eq!(tracker.update(frame.view()).unwrap(), rect);
        }
        assert!(tracker.last_psr().unwrap() > 0.0);
    }
}
