use ndarray::Array1;
use std::cmp::Ordering;

pub(crate) fn sigmoid(logits: &Array1<f32>) -> Array1<f32> {
    logits.mapv(|x| 1.0 / (1.0 + (-x).exp()))
}

/// Indices of the `k` largest values, largest first.
///
/// Equal values keep their index order. NaN sorts last.
pub(crate) fn top_k_indices(values: &Array1<f32>, k: usize) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..values.len()).collect();
    indices.sort_by(|&a, &b| {
        let (x, y) = (values[a], values[b]);
        match (x.is_nan(), y.is_nan()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Greater,
            (false, true) => Ordering::Less,
            (false, false) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        }
    });
    indices.truncate(k);
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_sigmoid() {
        let probs = sigmoid(&array![0.0, 100.0, -100.0]);
        assert!((probs[0] - 0.5).abs() < 1e-6);
        assert!((probs[1] - 1.0).abs() < 1e-6);
        assert!(probs[2].abs() < 1e-6);
    }

    #[test]
    fn test_top_k_order() {
        let values = array![0.1, 0.9, 0.3, 0.7, 0.5, 0.2];
        assert_eq!(top_k_indices(&values, 3), vec![1, 3, 4]);
    }

    #[test]
    fn test_top_k_ties_keep_index_order() {
        let values = array![0.5, 0.8, 0.5, 0.8];
        assert_eq!(top_k_indices(&values, 4), vec![1, 3, 0, 2]);
    }

    #[test]
    fn test_top_k_larger_than_len() {
        let values = array![0.2, 0.4];
        assert_eq!(top_k_indices(&values, 5), vec![1, 0]);
    }

    #[test]
    fn test_top_k_nan_last() {
        let values = array![f32::NAN, 0.1, 0.3];
        assert_eq!(top_k_indices(&values, 3), vec![2, 1, 0]);
    }
}
