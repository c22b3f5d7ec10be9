use ndarray::{Array2, ArrayView2, Zip};

use crate::error::{Result, TrackError};
use crate::signal::fft::{Fft2, fftshift};

/// Gaussian kernel between `x` and every cyclic shift of `y`, evaluated in one FFT pass.
///
/// The zero-shift term sits at the center of the returned surface.
pub fn dense_gaussian_kernel(
    x: ArrayView2<'_, f64>,
    y: ArrayView2<'_, f64>,
    sigma: f64,
) -> Result<Array2<f64>> {
    let (rows, cols) = x.dim();
    dense_gaussian_kernel_with(&Fft2::new(rows, cols), x, y, sigma)
}

/// [`dense_gaussian_kernel`] reusing the FFT plans of a tracker.
pub fn dense_gaussian_kernel_with(
    fft: &Fft2,
    x: ArrayView2<'_, f64>,
    y: ArrayView2<'_, f64>,
    sigma: f64,
) -> Result<Array2<f64>> {
    if x.dim() != y.dim() {
        return Err(TrackError::ShapeMismatch {
            left: x.dim(),
            right: y.dim(),
        });
    }
    if x.dim() != fft.shape() {
        return Err(TrackError::ShapeMismatch {
            left: x.dim(),
            right: fft.shape(),
        });
    }

    let xx: f64 = x.iter().map(|v| v * v).sum();
    let yy: f64 = y.iter().map(|v| v * v).sum();

    let mut cross = fft.forward_real(x);
    let yf = fft.forward_real(y);
    Zip::from(&mut cross).and(&yf).for_each(|c, &b| *c *= b.conj());
    fft.inverse(&mut cross);
    let cross = fftshift(&cross);

    let numel = x.len() as f64;
    let scale = -1.0 / (sigma * sigma);
    Ok(cross.mapv(|c| (scale * (xx + yy - 2.0 * c).norm() / numel).exp()))
}

/// Desired correlation output: a Gaussian bump of shape `(2h, 2w)` centered at `(h, w)`.
///
/// The bandwidth is `sqrt(2h * 2w) / 16`.
pub fn build_target_response(height: usize, width: usize) -> Array2<f64> {
    let (rows, cols) = (2 * height, 2 * width);
    let s = ((rows * cols) as f64).sqrt() / 16.0;
    let s2 = s * s;
    let (cy, cx) = (height as f64, width as f64);
    Array2::from_shape_fn((rows, cols), |(y, x)| {
        let dy = y as f64 - cy;
        let dx = x as f64 - cx;
        (-(dx * dx + dy * dy) / s2).exp()
    })
}
