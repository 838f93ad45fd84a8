//! Parameter storage for a two-layer Boltzmann machine.
//!
//! All linear algebra is dense `nalgebra` storage: bias vectors are
//! [`DVector`]s and the coupling matrix is a [`DMatrix`] indexed
//! `(visible, hidden)`. Optional per-hidden sparsity biases and per-visible
//! Gaussian precisions live here too so a single checkpoint record can carry
//! the whole family.

use nalgebra::{DMatrix, DVector};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{BoltzError, Result};

/// Dense parameter store shared by every model in the family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RbmParams {
    v_size: usize,
    h_size: usize,
    /// Visible biases, length `v_size`.
    pub b: DVector<f64>,
    /// Hidden biases, length `h_size`.
    pub c: DVector<f64>,
    /// Couplings, `v_size x h_size`; `w[(i, j)]` couples visible `i` to
    /// hidden `j`.
    pub w: DMatrix<f64>,
    /// Per-hidden sparsity biases (log of the sparse penalty strength),
    /// present only for the sparse family.
    pub sparse: Option<DVector<f64>>,
    /// Per-visible Gaussian precisions, present only for Gaussian visible
    /// layers. Serialized with checkpoints but held fixed by training.
    pub precision: Option<DVector<f64>>,
}

impl RbmParams {
    /// All-zero parameters for the given layer sizes.
    pub fn zeros(v_size: usize, h_size: usize) -> Self {
        RbmParams {
            v_size,
            h_size,
            b: DVector::zeros(v_size),
            c: DVector::zeros(h_size),
            w: DMatrix::zeros(v_size, h_size),
            sparse: None,
            precision: None,
        }
    }

    /// Enable the sparsity parameter family, initialized to zero
    /// (penalty strength `exp(0) = 1`).
    pub fn with_sparse(mut self) -> Self {
        self.sparse = Some(DVector::zeros(self.h_size));
        self
    }

    /// Enable per-visible Gaussian precisions, initialized to one.
    pub fn with_precision(mut self) -> Self {
        self.precision = Some(DVector::from_element(self.v_size, 1.0));
        self
    }

    pub fn v_size(&self) -> usize {
        self.v_size
    }

    pub fn h_size(&self) -> usize {
        self.h_size
    }

    pub fn has_sparse(&self) -> bool {
        self.sparse.is_some()
    }

    pub fn has_precision(&self) -> bool {
        self.precision.is_some()
    }

    /// Reset every parameter (including sparse and precision, if present)
    /// to its zero initialization.
    pub fn set_zero(&mut self) {
        self.b.fill(0.0);
        self.c.fill(0.0);
        self.w.fill(0.0);
        if let Some(sparse) = &mut self.sparse {
            sparse.fill(0.0);
        }
        if let Some(precision) = &mut self.precision {
            precision.fill(1.0);
        }
    }

    /// Draw biases and couplings uniformly from `[-range, range]`.
    ///
    /// Sparse biases start at zero and precisions at one regardless of the
    /// draw; both have fixed natural starting points.
    pub fn init_uniform<R: Rng + ?Sized>(&mut self, rng: &mut R, range: f64) {
        let dist = Uniform::new_inclusive(-range, range);
        for x in self.b.iter_mut() {
            *x = dist.sample(rng);
        }
        for x in self.c.iter_mut() {
            *x = dist.sample(rng);
        }
        for x in self.w.iter_mut() {
            *x = dist.sample(rng);
        }
        if let Some(sparse) = &mut self.sparse {
            sparse.fill(0.0);
        }
        if let Some(precision) = &mut self.precision {
            precision.fill(1.0);
        }
    }

    /// Xavier-style coupling initialization: biases stay zero, couplings are
    /// drawn uniformly with range `sqrt(6 / (v_size + h_size))`.
    pub fn init_xavier<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.set_zero();
        let range = (6.0 / (self.v_size + self.h_size) as f64).sqrt();
        let dist = Uniform::new_inclusive(-range, range);
        for x in self.w.iter_mut() {
            *x = dist.sample(rng);
        }
    }

    /// Check that every stored vector and matrix agrees with the declared
    /// layer sizes. Used after deserializing a checkpoint.
    pub fn validate(&self) -> Result<()> {
        if self.b.len() != self.v_size {
            return Err(BoltzError::dims("visible bias", self.v_size, self.b.len()));
        }
        if self.c.len() != self.h_size {
            return Err(BoltzError::dims("hidden bias", self.h_size, self.c.len()));
        }
        if self.w.nrows() != self.v_size || self.w.ncols() != self.h_size {
            return Err(BoltzError::dims(
                "coupling matrix",
                self.v_size * self.h_size,
                self.w.nrows() * self.w.ncols(),
            ));
        }
        if let Some(sparse) = &self.sparse {
            if sparse.len() != self.h_size {
                return Err(BoltzError::dims("sparse bias", self.h_size, sparse.len()));
            }
        }
        if let Some(precision) = &self.precision {
            if precision.len() != self.v_size {
                return Err(BoltzError::dims(
                    "precision",
                    self.v_size,
                    precision.len(),
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn zeros_has_declared_shapes() {
        let p = RbmParams::zeros(3, 2);
        assert_eq!(p.b.len(), 3);
        assert_eq!(p.c.len(), 2);
        assert_eq!((p.w.nrows(), p.w.ncols()), (3, 2));
        assert!(p.sparse.is_none());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn uniform_init_stays_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut p = RbmParams::zeros(4, 3).with_sparse();
        p.init_uniform(&mut rng, 0.1);
        assert!(p.w.iter().all(|&x| x.abs() <= 0.1));
        assert!(p.b.iter().all(|&x| x.abs() <= 0.1));
        // Sparse biases keep their natural starting point.
        assert!(p.sparse.as_ref().unwrap().iter().all(|&x| x == 0.0));
    }

    #[test]
    fn validate_catches_truncated_vectors() {
        let mut p = RbmParams::zeros(3, 2);
        p.b = DVector::zeros(2);
        assert!(p.validate().is_err());
    }
}
