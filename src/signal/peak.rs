use ndarray::ArrayView2;

/// Row-major `(row, col)` of the global maximum.
///
/// Ties resolve to the first index met in a row-major scan; NaN never wins.
pub fn max_response_location(surface: ArrayView2<'_, f64>) -> (usize, usize) {
    let mut best = (0, 0);
    let mut best_value = f64::NEG_INFINITY;
    for ((row, col), &value) in surface.indexed_iter() {
        if value > best_value {
            best_value = value;
            best = (row, col);
        }
    }
    best
}

/// Peak-to-sidelobe ratio `(max - mean) / std` of a response surface.
///
/// A sharp, isolated peak scores high; a flat or ambiguous surface scores near zero.
pub fn peak_to_sidelobe_ratio(surface: ArrayView2<'_, f64>) -> f64 {
    let n = surface.len();
    if n == 0 {
        return 0.0;
    }
    let mut sum = 0.0;
    let mut sum_sq = 0.0;
    let mut max = f64::NEG_INFINITY;
    for &v in surface.iter() {
        sum += v;
        sum_sq += v * v;
        max = max.max(v);
    }
    let mean = sum / n as f64;
    let var = (sum_sq / n as f64 - mean * mean).max(0.0);
    let std = var.sqrt();
    if std <= f64::EPSILON {
        0.0
    } else {
        (max - mean) / std
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, array};

    #[test]
    fn test_max_location() {
        let surface = array![[0.1, 0.2, 0.3], [0.4, 0.9, 0.5]];
        assert_eq!(max_response_location(surface.view()), (1, 1));
    }

    #[test]
    fn test_ties_take_first_in_row_major_order() {
        let surface = array![[0.0, 1.0, 0.0], [1.0, 0.0, 1.0]];
        assert_eq!(max_response_location(surface.view()), (0, 1));
        let flat = Array2::from_elem((4, 5), 3.0);
        assert_eq!(max_response_location(flat.view()), (0, 0));
    }

    #[test]
    fn test_nan_is_skipped() {
        let surface = array![[f64::NAN, 0.5], [0.7, f64::NAN]];
        assert_eq!(max_response_location(surface.view()), (1, 0));
    }

    #[test]
    fn test_psr() {
        let flat = Array2::from_elem((8, 8), 1.0);
        assert_eq!(peak_to_sidelobe_ratio(flat.view()), 0.0);

        let mut spike = Array2::zeros((8, 8));
        spike[[3, 4]] = 1.0;
        assert!(peak_to_sidelobe_ratio(spike.view()) > 7.0);
    }
}
