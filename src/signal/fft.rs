//! Two-dimensional FFT over ndarray matrices, built from rustfft row and column passes.

use std::fmt;
use std::sync::Arc;

use ndarray::{Array2, ArrayView2, Axis};
use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Cached forward and inverse plans for one `(rows, cols)` shape.
#[derive(Clone)]
pub struct Fft2 {
    rows: usize,
    cols: usize,
    row_forward: Arc<dyn Fft<f64>>,
    row_inverse: Arc<dyn Fft<f64>>,
    col_forward: Arc<dyn Fft<f64>>,
    col_inverse: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for Fft2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fft2")
            .field("rows", &self.rows)
            .field("cols", &self.cols)
            .finish()
    }
}

impl Fft2 {
    pub fn new(rows: usize, cols: usize) -> Self {
        let mut planner = FftPlanner::new();
        Self {
            rows,
            cols,
            row_forward: planner.plan_fft_forward(cols),
            row_inverse: planner.plan_fft_inverse(cols),
            col_forward: planner.plan_fft_forward(rows),
            col_inverse: planner.plan_fft_inverse(rows),
        }
    }

    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// Forward transform of a real matrix.
    pub fn forward_real(&self, input: ArrayView2<'_, f64>) -> Array2<Complex64> {
        let mut data = input.mapv(|v| Complex64::new(v, 0.0));
        self.forward(&mut data);
        data
    }

    /// In-place unnormalized forward transform.
    pub fn forward(&self, data: &mut Array2<Complex64>) {
        debug_assert_eq!(data.dim(), (self.rows, self.cols));
        self.process(data, &self.row_forward, &self.col_forward);
    }

    /// In-place inverse transform, normalized by `1 / (rows * cols)`.
    pub fn inverse(&self, data: &mut Array2<Complex64>) {
        debug_assert_eq!(data.dim(), (self.rows, self.cols));
        self.process(data, &self.row_inverse, &self.col_inverse);
        let scale = 1.0 / (self.rows * self.cols) as f64;
        data.mapv_inplace(|v| v * scale);
    }

    fn process(
        &self,
        data: &mut Array2<Complex64>,
        row_fft: &Arc<dyn Fft<f64>>,
        col_fft: &Arc<dyn Fft<f64>>,
    ) {
        let mut line = vec![Complex64::new(0.0, 0.0); self.cols.max(self.rows)];

        for mut row in data.axis_iter_mut(Axis(0)) {
            let buf = &mut line[..self.cols];
            buf.iter_mut().zip(row.iter()).for_each(|(b, &v)| *b = v);
            row_fft.process(buf);
            row.iter_mut().zip(buf.iter()).for_each(|(v, &b)| *v = b);
        }

        for mut col in data.axis_iter_mut(Axis(1)) {
            let buf = &mut line[..self.rows];
            buf.iter_mut().zip(col.iter()).for_each(|(b, &v)| *b = v);
            col_fft.process(buf);
            col.iter_mut().zip(buf.iter()).for_each(|(v, &b)| *v = b);
        }
    }
}

/// Move the zero-frequency (zero-shift) element to the center of the matrix.
pub fn fftshift<T: Clone>(input: &Array2<T>) -> Array2<T> {
    let (rows, cols) = input.dim();
    let (sr, sc) = (rows / 2, cols / 2);
    Array2::from_shape_fn((rows, cols), |(i, j)| {
        input[[(i + rows - sr) % rows, (j + cols - sc) % cols]].clone()
    })
}
