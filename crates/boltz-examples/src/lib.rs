//! # boltz-examples utilities
//!
//! Shared helpers for the runnable examples: log setup and small synthetic
//! datasets.

use nalgebra::DVector;

/// Install a human-readable tracing subscriber for example binaries.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();
}

/// A small binary dataset concentrated on two antipodal patterns, with a
/// handful of noisy outliers. Enough structure for a machine to learn, small
/// enough to train exactly.
pub fn striped_binary_dataset(v_size: usize, copies: usize) -> Vec<DVector<f64>> {
    let mut dataset = Vec::with_capacity(2 * copies + 1);
    let on = DVector::from_fn(v_size, |i, _| (i % 2) as f64);
    let off = DVector::from_fn(v_size, |i, _| ((i + 1) % 2) as f64);
    for _ in 0..copies {
        dataset.push(on.clone());
        dataset.push(off.clone());
    }
    dataset.push(DVector::zeros(v_size));
    dataset
}

/// The same patterns on the spin domain `{-1, +1}`.
pub fn striped_spin_dataset(v_size: usize, copies: usize) -> Vec<DVector<f64>> {
    striped_binary_dataset(v_size, copies)
        .into_iter()
        .map(|v| v.map(|x| 2.0 * x - 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn striped_dataset_has_expected_shape() {
        let data = striped_binary_dataset(4, 3);
        assert_eq!(data.len(), 7);
        assert!(data.iter().all(|v| v.len() == 4));
        assert_eq!(data[0][1], 1.0);
        assert_eq!(data[1][1], 0.0);
    }

    #[test]
    fn spin_dataset_lives_on_plus_minus_one() {
        let data = striped_spin_dataset(4, 1);
        assert!(data
            .iter()
            .all(|v| v.iter().all(|&x| x == 1.0 || x == -1.0)));
    }
}
