//! Per-coordinate update strategies.
//!
//! The trainer computes a raw gradient per parameter family and asks the
//! optimizer for the actual step, one coordinate at a time. State (momentum
//! buffers, Adam moments) is per coordinate; [`Optimizer::advance`] is
//! called exactly once per training step, after all deltas of that step.

use nalgebra::{DMatrix, DVector};

pub trait Optimizer {
    fn visible_bias_delta(&mut self, grad: f64, i: usize) -> f64;
    fn hidden_bias_delta(&mut self, grad: f64, j: usize) -> f64;
    fn weight_delta(&mut self, grad: f64, i: usize, j: usize) -> f64;
    fn sparse_delta(&mut self, grad: f64, j: usize) -> f64;

    /// Advance per-step state (e.g. the Adam timestep).
    fn advance(&mut self);
}

/// Classical momentum: `m ← ρ·m + η·g`, step by `m`.
#[derive(Debug, Clone)]
pub struct Momentum {
    learning_rate: f64,
    momentum_rate: f64,
    v_bias: DVector<f64>,
    h_bias: DVector<f64>,
    weight: DMatrix<f64>,
    sparse_bias: DVector<f64>,
}

impl Momentum {
    pub fn new(v_size: usize, h_size: usize, learning_rate: f64, momentum_rate: f64) -> Self {
        Momentum {
            learning_rate,
            momentum_rate,
            v_bias: DVector::zeros(v_size),
            h_bias: DVector::zeros(h_size),
            weight: DMatrix::zeros(v_size, h_size),
            sparse_bias: DVector::zeros(h_size),
        }
    }

    fn step(m: &mut f64, grad: f64, eta: f64, rho: f64) -> f64 {
        *m = rho * *m + eta * grad;
        *m
    }
}

impl Optimizer for Momentum {
    fn visible_bias_delta(&mut self, grad: f64, i: usize) -> f64 {
        Self::step(
            &mut self.v_bias[i],
            grad,
            self.learning_rate,
            self.momentum_rate,
        )
    }

    fn hidden_bias_delta(&mut self, grad: f64, j: usize) -> f64 {
        Self::step(
            &mut self.h_bias[j],
            grad,
            self.learning_rate,
            self.momentum_rate,
        )
    }

    fn weight_delta(&mut self, grad: f64, i: usize, j: usize) -> f64 {
        Self::step(
            &mut self.weight[(i, j)],
            grad,
            self.learning_rate,
            self.momentum_rate,
        )
    }

    fn sparse_delta(&mut self, grad: f64, j: usize) -> f64 {
        Self::step(
            &mut self.sparse_bias[j],
            grad,
            self.learning_rate,
            self.momentum_rate,
        )
    }

    fn advance(&mut self) {}
}

/// Adam with the standard defaults (α=0.001, β1=0.9, β2=0.999, ε=1e-8).
#[derive(Debug, Clone)]
pub struct Adam {
    alpha: f64,
    beta1: f64,
    beta2: f64,
    epsilon: f64,
    t: i32,
    m_v_bias: DVector<f64>,
    m_h_bias: DVector<f64>,
    m_weight: DMatrix<f64>,
    m_sparse: DVector<f64>,
    v_v_bias: DVector<f64>,
    v_h_bias: DVector<f64>,
    v_weight: DMatrix<f64>,
    v_sparse: DVector<f64>,
}

impl Adam {
    pub fn new(v_size: usize, h_size: usize, alpha: f64) -> Self {
        Adam {
            alpha,
            beta1: 0.9,
            beta2: 0.999,
            epsilon: 1e-8,
            t: 1,
            m_v_bias: DVector::zeros(v_size),
            m_h_bias: DVector::zeros(h_size),
            m_weight: DMatrix::zeros(v_size, h_size),
            m_sparse: DVector::zeros(h_size),
            v_v_bias: DVector::zeros(v_size),
            v_h_bias: DVector::zeros(h_size),
            v_weight: DMatrix::zeros(v_size, h_size),
            v_sparse: DVector::zeros(h_size),
        }
    }

    fn step(&self, m: &mut f64, v: &mut f64, grad: f64) -> f64 {
        *m = self.beta1 * *m + (1.0 - self.beta1) * grad;
        *v = self.beta2 * *v + (1.0 - self.beta2) * grad * grad;
        let m_hat = *m / (1.0 - self.beta1.powi(self.t));
        let v_hat = *v / (1.0 - self.beta2.powi(self.t));
        self.alpha * m_hat / (v_hat.sqrt() + self.epsilon)
    }
}

impl Optimizer for Adam {
    fn visible_bias_delta(&mut self, grad: f64, i: usize) -> f64 {
        let (mut m, mut v) = (self.m_v_bias[i], self.v_v_bias[i]);
        let delta = self.step(&mut m, &mut v, grad);
        self.m_v_bias[i] = m;
        self.v_v_bias[i] = v;
        delta
    }

    fn hidden_bias_delta(&mut self, grad: f64, j: usize) -> f64 {
        let (mut m, mut v) = (self.m_h_bias[j], self.v_h_bias[j]);
        let delta = self.step(&mut m, &mut v, grad);
        self.m_h_bias[j] = m;
        self.v_h_bias[j] = v;
        delta
    }

    fn weight_delta(&mut self, grad: f64, i: usize, j: usize) -> f64 {
        let (mut m, mut v) = (self.m_weight[(i, j)], self.v_weight[(i, j)]);
        let delta = self.step(&mut m, &mut v, grad);
        self.m_weight[(i, j)] = m;
        self.v_weight[(i, j)] = v;
        delta
    }

    fn sparse_delta(&mut self, grad: f64, j: usize) -> f64 {
        let (mut m, mut v) = (self.m_sparse[j], self.v_sparse[j]);
        let delta = self.step(&mut m, &mut v, grad);
        self.m_sparse[j] = m;
        self.v_sparse[j] = v;
        delta
    }

    fn advance(&mut self) {
        self.t += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn momentum_accumulates_across_steps() {
        let mut opt = Momentum::new(1, 1, 0.1, 0.5);
        let first = opt.visible_bias_delta(1.0, 0);
        assert!((first - 0.1).abs() < 1e-15);
        let second = opt.visible_bias_delta(1.0, 0);
        assert!((second - 0.15).abs() < 1e-15);
    }

    #[test]
    fn adam_first_step_is_alpha_sized() {
        let mut opt = Adam::new(1, 1, 0.001);
        // With bias correction the first step is alpha·g/(|g| + eps·corr).
        let delta = opt.visible_bias_delta(0.5, 0);
        assert!((delta - 0.001).abs() < 1e-6);
        let negative = opt.hidden_bias_delta(-0.5, 0);
        assert!((negative + 0.001).abs() < 1e-6);
    }

    #[test]
    fn adam_coordinates_are_independent() {
        let mut opt = Adam::new(2, 1, 0.001);
        opt.visible_bias_delta(1.0, 0);
        // Coordinate 1 was never touched; its first step still behaves
        // like a first step.
        let delta = opt.visible_bias_delta(1.0, 1);
        assert!((delta - 0.001).abs() < 1e-6);
    }
}
