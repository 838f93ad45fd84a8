//! Moment accumulators for gradient estimation.
//!
//! One buffer family per parameter family. The contract throughout the
//! trainer is accumulate-sums-then-scale: workers add raw per-sample (or
//! per-state) terms, partial buffers are merged, and the caller divides by
//! the sample count or partition function at the end.

use nalgebra::{DMatrix, DVector};

/// Per-parameter-family moment sums.
#[derive(Debug, Clone, PartialEq)]
pub struct MomentStats {
    /// `Σ v_i` terms, one per visible unit.
    pub v_bias: DVector<f64>,
    /// `Σ E[h_j | v]` terms, one per hidden unit.
    pub h_bias: DVector<f64>,
    /// `Σ v_i·E[h_j | v]` terms.
    pub weight: DMatrix<f64>,
    /// `Σ E[−s_j·|h_j| | v]` terms (zero when the model has no sparsity).
    pub sparse_bias: DVector<f64>,
    /// `Σ v_i²/2` terms for the Gaussian precision family.
    pub v_square: DVector<f64>,
}

impl MomentStats {
    pub fn zeros(v_size: usize, h_size: usize) -> Self {
        MomentStats {
            v_bias: DVector::zeros(v_size),
            h_bias: DVector::zeros(h_size),
            weight: DMatrix::zeros(v_size, h_size),
            sparse_bias: DVector::zeros(h_size),
            v_square: DVector::zeros(v_size),
        }
    }

    pub fn reset(&mut self) {
        self.v_bias.fill(0.0);
        self.h_bias.fill(0.0);
        self.weight.fill(0.0);
        self.sparse_bias.fill(0.0);
        self.v_square.fill(0.0);
    }

    /// Fold another partial sum into this one.
    pub fn merge(&mut self, other: &MomentStats) {
        self.v_bias += &other.v_bias;
        self.h_bias += &other.h_bias;
        self.weight += &other.weight;
        self.sparse_bias += &other.sparse_bias;
        self.v_square += &other.v_square;
    }

    /// Scale every buffer, turning sums into means.
    pub fn scale(&mut self, factor: f64) {
        self.v_bias *= factor;
        self.h_bias *= factor;
        self.weight *= factor;
        self.sparse_bias *= factor;
        self.v_square *= factor;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_then_scale_is_the_mean() {
        let mut a = MomentStats::zeros(2, 1);
        a.v_bias[0] = 1.0;
        a.weight[(1, 0)] = 4.0;
        let mut b = MomentStats::zeros(2, 1);
        b.v_bias[0] = 3.0;
        b.weight[(1, 0)] = 2.0;

        a.merge(&b);
        a.scale(0.5);
        assert_eq!(a.v_bias[0], 2.0);
        assert_eq!(a.weight[(1, 0)], 3.0);
    }
}
