//! The shared inference surface of the Boltzmann machine family.
//!
//! Every model in the family is a bipartite machine: a visible layer `v`, a
//! hidden layer `h`, and an energy
//!
//! ```text
//! E(v, h) = -b·v - c·h - vᵀ W h + Σ_j s_j |h_j|   (s_j = exp(sparse_j))
//! ```
//!
//! [`EnergyModel`] exposes a tiny accessor surface (parameters, node state,
//! domains) and derives everything else as provided methods: local
//! potentials, conditional distributions, local hidden normalizers, exact
//! partition functions, and the exact moments the gradient needs. A model
//! and its scratch evaluator implement the same trait, so enumeration and
//! sampling code is written once.
//!
//! ## Exactness boundaries
//!
//! Enumeration-based operations ([`normal_constant`](EnergyModel::normal_constant),
//! the `expected_value_*` family) require a finite visible domain; a
//! Gaussian visible layer gets [`BoltzError::Unsupported`]. With a
//! continuous hidden domain the local normalizer and the activations have
//! closed forms, but the weighted sums inside the exact moments do not;
//! those return [`BoltzError::NotDerived`] instead of a wrong number.

use boltz_core::{ensure_finite, BoltzError, HiddenKind, NodeState, RbmParams, Result};
use boltz_core::{HiddenDomain, StateCounter, VisibleDomain};
use nalgebra::DVector;

use crate::math::{exp_h_integral, exp_integral};

pub trait EnergyModel {
    fn params(&self) -> &RbmParams;
    fn nodes(&self) -> &NodeState;
    fn nodes_mut(&mut self) -> &mut NodeState;
    fn visible_domain(&self) -> &VisibleDomain;
    fn hidden_domain(&self) -> &HiddenDomain;

    fn v_size(&self) -> usize {
        self.params().v_size()
    }

    fn h_size(&self) -> usize {
        self.params().h_size()
    }

    /// Local potential on visible unit `i` given the current hidden state:
    /// `lambda_i = b_i + Σ_j w_ij h_j`.
    fn lambda(&self, i: usize) -> f64 {
        let params = self.params();
        params.b[i] + params.w.row(i).transpose().dot(&self.nodes().h)
    }

    /// Local potential on hidden unit `j` given the current visible state:
    /// `mu_j = c_j + Σ_i w_ij v_i`.
    fn mu(&self, j: usize) -> f64 {
        let params = self.params();
        params.c[j] + params.w.column(j).dot(&self.nodes().v)
    }

    /// All hidden potentials at once, `mu = c + Wᵀ v`.
    fn mu_vect(&self) -> DVector<f64> {
        let params = self.params();
        &params.c + params.w.transpose() * &self.nodes().v
    }

    /// Effective sparsity penalty scale `s_j = exp(sparse_j)`; zero when the
    /// model carries no sparsity parameters.
    fn mu_star(&self, j: usize) -> f64 {
        match &self.params().sparse {
            Some(sparse) => sparse[j].exp(),
            None => 0.0,
        }
    }

    /// Gaussian precision of visible unit `i` (one when absent).
    fn precision(&self, i: usize) -> f64 {
        match &self.params().precision {
            Some(precision) => precision[i],
            None => 1.0,
        }
    }

    /// Local hidden normalizer `Z_j(mu)`.
    ///
    /// Discrete: `Σ_h exp(mu·h − s_j·|h|)` over the value split. Continuous:
    /// the density integral split at zero into its two exponential pieces.
    fn hidden_local_normalizer_with(&self, j: usize, mu: f64) -> f64 {
        let s = self.mu_star(j);
        let dom = self.hidden_domain();
        match dom.kind() {
            HiddenKind::Discrete => dom
                .values()
                .iter()
                .map(|&h| (mu * h - s * h.abs()).exp())
                .sum(),
            HiddenKind::Continuous => {
                exp_integral(mu + s, dom.h_min(), 0.0) + exp_integral(mu - s, 0.0, dom.h_max())
            }
        }
    }

    fn hidden_local_normalizer(&self, j: usize) -> f64 {
        self.hidden_local_normalizer_with(j, self.mu(j))
    }

    /// `Π_j Z_j(mu_j)` for a precomputed potential vector.
    fn hidden_normalizer_product(&self, mu_vect: &DVector<f64>) -> f64 {
        (0..self.h_size())
            .map(|j| self.hidden_local_normalizer_with(j, mu_vect[j]))
            .product()
    }

    /// Discrete weighted sum `Σ_h h·exp(mu·h − s_j·|h_j|)`; the numerator of
    /// the hidden activation. Only meaningful for a discrete hidden domain.
    fn hidden_weighted_sum(&self, j: usize, mu: f64) -> f64 {
        let s = self.mu_star(j);
        self.hidden_domain()
            .values()
            .iter()
            .map(|&h| h * (mu * h - s * h.abs()).exp())
            .sum()
    }

    /// Discrete weighted sum `Σ_h (−s_j·|h|)·exp(mu·h − s_j·|h|)`; the
    /// numerator of the sparsity activation.
    fn hidden_sparse_weighted_sum(&self, j: usize, mu: f64) -> f64 {
        let s = self.mu_star(j);
        self.hidden_domain()
            .values()
            .iter()
            .map(|&h| -s * h.abs() * (mu * h - s * h.abs()).exp())
            .sum()
    }

    /// Conditional mean `E[h_j | v]` with a precomputed potential.
    fn act_hid_with(&self, j: usize, mu: f64) -> f64 {
        let z_j = self.hidden_local_normalizer_with(j, mu);
        let dom = self.hidden_domain();
        let numer = match dom.kind() {
            HiddenKind::Discrete => self.hidden_weighted_sum(j, mu),
            HiddenKind::Continuous => {
                let s = self.mu_star(j);
                exp_h_integral(mu + s, dom.h_min(), 0.0)
                    + exp_h_integral(mu - s, 0.0, dom.h_max())
            }
        };
        numer / z_j
    }

    /// Conditional mean `E[h_j | v]`.
    fn act_hid(&self, j: usize) -> f64 {
        self.act_hid_with(j, self.mu(j))
    }

    /// Sparsity activation `E[−s_j·|h_j| | v]` with a precomputed potential.
    fn act_hid_sparse_with(&self, j: usize, mu: f64) -> f64 {
        let z_j = self.hidden_local_normalizer_with(j, mu);
        let dom = self.hidden_domain();
        let numer = match dom.kind() {
            HiddenKind::Discrete => self.hidden_sparse_weighted_sum(j, mu),
            HiddenKind::Continuous => {
                let s = self.mu_star(j);
                // |h| = -h on the negative piece.
                let neg = exp_h_integral(mu + s, dom.h_min(), 0.0);
                let pos = exp_h_integral(mu - s, 0.0, dom.h_max());
                -s * (pos - neg)
            }
        };
        numer / z_j
    }

    /// Sparsity activation `E[−s_j·|h_j| | v]`.
    fn act_hid_sparse(&self, j: usize) -> f64 {
        self.act_hid_sparse_with(j, self.mu(j))
    }

    /// Single-site visible conditional.
    ///
    /// Finite domain: `P(v_i = value | h)` normalized over the value set.
    /// Gaussian domain: the density of `N(lambda_i / p_i, 1 / p_i)`.
    fn cond_prob_vis(&self, i: usize, value: f64) -> f64 {
        let lambda = self.lambda(i);
        match self.visible_domain() {
            VisibleDomain::Finite(values) => {
                let denom: f64 = values.iter().map(|&v| (lambda * v).exp()).sum();
                (lambda * value).exp() / denom
            }
            VisibleDomain::Gaussian => {
                let p = self.precision(i);
                let mean = lambda / p;
                (p / (2.0 * std::f64::consts::PI)).sqrt()
                    * (-0.5 * p * (value - mean) * (value - mean)).exp()
            }
        }
    }

    /// Single-site hidden conditional `P(h_j = value | v)` (a density for a
    /// continuous hidden domain).
    fn cond_prob_hid(&self, j: usize, value: f64) -> f64 {
        let mu = self.mu(j);
        let s = self.mu_star(j);
        (mu * value - s * value.abs()).exp() / self.hidden_local_normalizer_with(j, mu)
    }

    /// The visible value set for exhaustive enumeration, or an error for a
    /// Gaussian visible layer.
    fn enumerable_visible_values(&self) -> Result<Vec<f64>> {
        match self.visible_domain() {
            VisibleDomain::Finite(values) => Ok(values.clone()),
            VisibleDomain::Gaussian => Err(BoltzError::Unsupported(
                "exhaustive enumeration over a Gaussian visible layer".into(),
            )),
        }
    }

    /// Partition function `Z = Σ_v exp(b·v)·Π_j Z_j(mu_j)` by exhaustive
    /// enumeration of the visible state space. Overwrites the visible nodes.
    fn normal_constant(&mut self) -> Result<f64> {
        let values = self.enumerable_visible_values()?;
        let mut sc = StateCounter::uniform(self.v_size(), values.len())?;

        let mut z = 0.0;
        for _ in 0..sc.max_count() {
            self.load_visible_state(sc.state(), &values);
            let mu_vect = self.mu_vect();
            let b_dot_v = self.nodes().v.dot(&self.params().b);
            z += b_dot_v.exp() * self.hidden_normalizer_product(&mu_vect);
            sc.advance();
        }

        ensure_finite(z, "normal_constant")
    }

    /// Helmholtz free energy `-ln Z`.
    fn free_energy(&mut self) -> Result<f64> {
        Ok(-self.normal_constant()?.ln())
    }

    /// Marginal probability of a visible configuration, hidden layer summed
    /// out. Recomputes the partition function; the visible nodes are left
    /// holding `data`.
    fn prob_vis(&mut self, data: &[f64]) -> Result<f64> {
        let z = self.normal_constant()?;
        self.prob_vis_with(data, z)
    }

    /// [`prob_vis`](Self::prob_vis) with a precomputed partition function.
    fn prob_vis_with(&mut self, data: &[f64], z: f64) -> Result<f64> {
        if data.len() != self.v_size() {
            return Err(BoltzError::dims("prob_vis data", self.v_size(), data.len()));
        }
        let nodes = self.nodes_mut();
        for (node, &value) in nodes.v.iter_mut().zip(data) {
            *node = value;
        }

        let mu_vect = self.mu_vect();
        let b_dot_v = self.nodes().v.dot(&self.params().b);
        Ok(b_dot_v.exp() * self.hidden_normalizer_product(&mu_vect) / z)
    }

    /// Exact moment `E[v_i]` with a precomputed partition function.
    fn expected_value_vis(&mut self, vindex: usize, z: f64) -> Result<f64> {
        self.check_moment_derived("expected_value_vis")?;
        let values = self.enumerable_visible_values()?;
        let mut sc = StateCounter::uniform(self.v_size(), values.len())?;

        let mut acc = 0.0;
        for _ in 0..sc.max_count() {
            self.load_visible_state(sc.state(), &values);
            let mu_vect = self.mu_vect();
            let b_dot_v = self.nodes().v.dot(&self.params().b);
            acc += self.nodes().v[vindex]
                * b_dot_v.exp()
                * self.hidden_normalizer_product(&mu_vect);
            sc.advance();
        }

        Ok(ensure_finite(acc, "expected_value_vis")? / z)
    }

    /// Exact moment `E[h_j]` with a precomputed partition function.
    fn expected_value_hid(&mut self, hindex: usize, z: f64) -> Result<f64> {
        self.check_moment_derived("expected_value_hid")?;
        let values = self.enumerable_visible_values()?;
        let mut sc = StateCounter::uniform(self.v_size(), values.len())?;

        let mut acc = 0.0;
        for _ in 0..sc.max_count() {
            self.load_visible_state(sc.state(), &values);
            let mu_vect = self.mu_vect();
            let b_dot_v = self.nodes().v.dot(&self.params().b);
            let mut term = b_dot_v.exp() * self.hidden_weighted_sum(hindex, mu_vect[hindex]);
            for l in 0..self.h_size() {
                if l != hindex {
                    term *= self.hidden_local_normalizer_with(l, mu_vect[l]);
                }
            }
            acc += term;
            sc.advance();
        }

        Ok(ensure_finite(acc, "expected_value_hid")? / z)
    }

    /// Exact moment `E[v_i·h_j]` with a precomputed partition function.
    fn expected_value_vis_hid(&mut self, vindex: usize, hindex: usize, z: f64) -> Result<f64> {
        self.check_moment_derived("expected_value_vis_hid")?;
        let values = self.enumerable_visible_values()?;
        let mut sc = StateCounter::uniform(self.v_size(), values.len())?;

        let mut acc = 0.0;
        for _ in 0..sc.max_count() {
            self.load_visible_state(sc.state(), &values);
            let mu_vect = self.mu_vect();
            let b_dot_v = self.nodes().v.dot(&self.params().b);
            let mut term = self.nodes().v[vindex]
                * b_dot_v.exp()
                * self.hidden_weighted_sum(hindex, mu_vect[hindex]);
            for l in 0..self.h_size() {
                if l != hindex {
                    term *= self.hidden_local_normalizer_with(l, mu_vect[l]);
                }
            }
            acc += term;
            sc.advance();
        }

        Ok(ensure_finite(acc, "expected_value_vis_hid")? / z)
    }

    /// Exact sparsity moment `E[−s_j·|h_j|]` with a precomputed partition
    /// function.
    fn expected_value_abs_hid(&mut self, hindex: usize, z: f64) -> Result<f64> {
        self.check_moment_derived("expected_value_abs_hid")?;
        let values = self.enumerable_visible_values()?;
        let mut sc = StateCounter::uniform(self.v_size(), values.len())?;

        let mut acc = 0.0;
        for _ in 0..sc.max_count() {
            self.load_visible_state(sc.state(), &values);
            let mu_vect = self.mu_vect();
            let b_dot_v = self.nodes().v.dot(&self.params().b);
            let mut term =
                b_dot_v.exp() * self.hidden_sparse_weighted_sum(hindex, mu_vect[hindex]);
            for l in 0..self.h_size() {
                if l != hindex {
                    term *= self.hidden_local_normalizer_with(l, mu_vect[l]);
                }
            }
            acc += term;
            sc.advance();
        }

        Ok(ensure_finite(acc, "expected_value_abs_hid")? / z)
    }

    /// Write the enumeration state into the visible nodes through the
    /// state-to-value map.
    fn load_visible_state(&mut self, state: &[usize], values: &[f64]) {
        let nodes = self.nodes_mut();
        for (node, &digit) in nodes.v.iter_mut().zip(state) {
            *node = values[digit];
        }
    }

    /// The exact-moment weighted sums have no derived closed form under a
    /// continuous hidden domain.
    fn check_moment_derived(&self, what: &'static str) -> Result<()> {
        if self.hidden_domain().is_continuous() {
            Err(BoltzError::NotDerived(what))
        } else {
            Ok(())
        }
    }
}
