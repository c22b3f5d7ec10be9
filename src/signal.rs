//! Stateless numeric routines behind the correlation trackers.

mod fft;
mod kernel;
mod patch;
mod peak;
mod window;

pub use fft::{Fft2, fftshift};
pub use kernel::{build_target_response, dense_gaussian_kernel, dense_gaussian_kernel_with};
pub use patch::crop_region;
pub use peak::{max_response_location, peak_to_sidelobe_ratio};
pub use window::{apply_window, sine_window};
