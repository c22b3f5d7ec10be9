use std::f64::consts::PI;

use ndarray::{Array2, ArrayView2};

/// One axis of the sine taper over `n` samples, exactly zero at both ends.
///
/// Evaluated from the nearer end so that the last sample is `sin(0)` rather
/// than a rounded `sin(pi)`.
fn taper(n: usize) -> Vec<f64> {
    if n < 2 {
        return vec![1.0; n];
    }
    let span = (n - 1) as f64;
    (0..n)
        .map(|i| (PI * i.min(n - 1 - i) as f64 / span).sin())
        .collect()
}

/// Separable sine window `sin(pi * j / (width - 1)) * sin(pi * i / (height - 1))`.
pub fn sine_window(height: usize, width: usize) -> Array2<f64> {
    let rows = taper(height);
    let cols = taper(width);
    Array2::from_shape_fn((height, width), |(i, j)| rows[i] * cols[j])
}

/// Normalize an 8-bit-range patch to `[-0.5, 0.5]` and taper it with [`sine_window`].
///
/// Tapering removes the discontinuity at the patch border that would otherwise
/// leak into every frequency bin of the following transforms.
pub fn apply_window(image: ArrayView2<'_, f64>) -> Array2<f64> {
    let (height, width) = image.dim();
    let mut out = sine_window(height, width);
    out.zip_mut_with(&image, |w, &px| *w *= px / 255.0 - 0.5);
    out
}
