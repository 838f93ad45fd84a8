//! Mini-batch gradient training.
//!
//! Both gradient estimators share the same positive phase (the data mean)
//! and differ only in the negative phase:
//!
//! - [`GradientMode::ContrastiveDivergence`]: per data point, clamp the
//!   visible layer, set each hidden unit to its conditional mean, run `cd_k`
//!   blocked Gibbs sweeps, and average the end states. `cd_k = 0` degenerates
//!   to the activations of the clamped data.
//! - [`GradientMode::Exact`]: one combined enumeration pass over the visible
//!   state space that accumulates the partition function and every moment
//!   family together, so the full exact gradient costs a single sweep of
//!   `|domain|^v_size` states.
//!
//! Negative-phase work is data-parallel with per-worker scratch evaluators;
//! each chain gets its own key split from the step key, so results do not
//! depend on the worker count.

use boltz_core::{ensure_finite, BoltzError, Result, StateCounter};
use boltz_models::{EnergyModel, Rbm};
use boltz_samplers::{GibbsSampler, RngKey};
use nalgebra::DVector;
use rand::seq::SliceRandom;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::optimizer::{Momentum, Optimizer};
use crate::stats::MomentStats;

/// Negative-phase estimator selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GradientMode {
    ContrastiveDivergence,
    Exact,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    pub epochs: usize,
    pub batch_size: usize,
    pub cd_k: usize,
    pub learning_rate: f64,
    pub momentum_rate: f64,
    pub mode: GradientMode,
    pub seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        TrainerConfig {
            epochs: 1,
            batch_size: 1,
            cd_k: 1,
            learning_rate: 0.01,
            momentum_rate: 0.9,
            mode: GradientMode::ContrastiveDivergence,
            seed: 0,
        }
    }
}

impl TrainerConfig {
    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_cd_k(mut self, cd_k: usize) -> Self {
        self.cd_k = cd_k;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_momentum_rate(mut self, momentum_rate: f64) -> Self {
        self.momentum_rate = momentum_rate;
        self
    }

    pub fn with_mode(mut self, mode: GradientMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }
}

/// Mini-batch trainer with a pluggable per-coordinate optimizer.
#[derive(Debug, Clone)]
pub struct Trainer<O> {
    config: TrainerConfig,
    optimizer: O,
    data_mean: MomentStats,
    model_mean: MomentStats,
    gradient: MomentStats,
    train_count: usize,
    key: RngKey,
}

impl Trainer<Momentum> {
    /// Momentum trainer sized for `rbm`, rates taken from the config.
    pub fn momentum(config: TrainerConfig, rbm: &Rbm) -> Self {
        let optimizer = Momentum::new(
            rbm.v_size(),
            rbm.h_size(),
            config.learning_rate,
            config.momentum_rate,
        );
        Trainer::new(config, optimizer, rbm)
    }
}

impl<O: Optimizer> Trainer<O> {
    pub fn new(config: TrainerConfig, optimizer: O, rbm: &Rbm) -> Self {
        let (v_size, h_size) = (rbm.v_size(), rbm.h_size());
        let key = RngKey::new(config.seed);
        Trainer {
            config,
            optimizer,
            data_mean: MomentStats::zeros(v_size, h_size),
            model_mean: MomentStats::zeros(v_size, h_size),
            gradient: MomentStats::zeros(v_size, h_size),
            train_count: 0,
            key,
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Number of completed gradient steps.
    pub fn train_count(&self) -> usize {
        self.train_count
    }

    /// Restore step bookkeeping from a checkpoint.
    pub fn set_train_count(&mut self, train_count: usize) {
        self.train_count = train_count;
    }

    pub fn gradient(&self) -> &MomentStats {
        &self.gradient
    }

    /// Run `epochs` gradient steps over the dataset.
    pub fn train(&mut self, rbm: &mut Rbm, dataset: &[DVector<f64>]) -> Result<()> {
        for epoch in 0..self.config.epochs {
            self.train_once(rbm, dataset)?;
            debug!(epoch, train_count = self.train_count, "gradient step done");
        }
        info!(
            epochs = self.config.epochs,
            train_count = self.train_count,
            "training finished"
        );
        Ok(())
    }

    /// One gradient step: shuffle, take a mini-batch, estimate both phases,
    /// apply the per-coordinate update.
    pub fn train_once(&mut self, rbm: &mut Rbm, dataset: &[DVector<f64>]) -> Result<()> {
        if dataset.is_empty() {
            return Err(BoltzError::InvalidConfig(
                "training dataset must be non-empty".into(),
            ));
        }

        let keys = self.key.split(3);
        let (shuffle_key, chain_key) = (keys[0], keys[1]);
        self.key = keys[2];

        let mut indexes: Vec<usize> = (0..dataset.len()).collect();
        indexes.shuffle(&mut shuffle_key.to_rng());
        // The batch can never exceed the dataset.
        let batch_size = self.config.batch_size.max(1).min(dataset.len());
        indexes.truncate(batch_size);

        self.calc_data_mean(rbm, dataset, &indexes)?;
        match self.config.mode {
            GradientMode::ContrastiveDivergence => {
                self.calc_model_mean_cd(rbm, dataset, &indexes, chain_key)?
            }
            GradientMode::Exact => self.calc_model_mean_exact(rbm)?,
        }
        self.calc_gradient();
        self.update_params(rbm);

        self.optimizer.advance();
        self.train_count += 1;
        Ok(())
    }

    /// Positive phase: clamp each batch point and average the data moments.
    fn calc_data_mean(
        &mut self,
        rbm: &Rbm,
        dataset: &[DVector<f64>],
        indexes: &[usize],
    ) -> Result<()> {
        let (v_size, h_size) = (rbm.v_size(), rbm.h_size());
        let has_sparse = rbm.params().has_sparse();
        let has_precision = rbm.params().has_precision();

        let mut stats = indexes
            .par_iter()
            .try_fold(
                || MomentStats::zeros(v_size, h_size),
                |mut acc, &n| -> Result<MomentStats> {
                    let data = &dataset[n];
                    if data.len() != v_size {
                        return Err(BoltzError::dims("training data", v_size, data.len()));
                    }

                    let mut scratch = rbm.scratch();
                    scratch.nodes_mut().v.copy_from(data);
                    let mu_vect = scratch.mu_vect();

                    acc.v_bias += data;
                    for j in 0..h_size {
                        let act = scratch.act_hid_with(j, mu_vect[j]);
                        acc.h_bias[j] += act;
                        for i in 0..v_size {
                            acc.weight[(i, j)] += data[i] * act;
                        }
                        if has_sparse {
                            acc.sparse_bias[j] += scratch.act_hid_sparse_with(j, mu_vect[j]);
                        }
                    }
                    if has_precision {
                        for i in 0..v_size {
                            acc.v_square[i] += data[i] * data[i] / 2.0;
                        }
                    }
                    Ok(acc)
                },
            )
            .try_reduce(
                || MomentStats::zeros(v_size, h_size),
                |mut a, b| {
                    a.merge(&b);
                    Ok(a)
                },
            )?;

        stats.scale(1.0 / indexes.len() as f64);
        self.data_mean = stats;
        Ok(())
    }

    /// Negative phase, CD-k: one chain per batch point, each seeded by its
    /// own split of the step key.
    fn calc_model_mean_cd(
        &mut self,
        rbm: &Rbm,
        dataset: &[DVector<f64>],
        indexes: &[usize],
        chain_key: RngKey,
    ) -> Result<()> {
        let (v_size, h_size) = (rbm.v_size(), rbm.h_size());
        let has_precision = rbm.params().has_precision();
        let cd_k = self.config.cd_k;
        let keys = chain_key.split(indexes.len());

        let mut stats = indexes
            .par_iter()
            .zip(keys.par_iter())
            .try_fold(
                || MomentStats::zeros(v_size, h_size),
                |mut acc, (&n, &key)| -> Result<MomentStats> {
                    let data = &dataset[n];
                    if data.len() != v_size {
                        return Err(BoltzError::dims("training data", v_size, data.len()));
                    }

                    let mut scratch = rbm.scratch();
                    scratch.nodes_mut().v.copy_from(data);
                    for j in 0..h_size {
                        let act = scratch.act_hid(j);
                        scratch.nodes_mut().h[j] = act;
                    }

                    let mut sampler = GibbsSampler::new(key);
                    for _ in 0..cd_k {
                        sampler.update_visible_layer(&mut scratch)?;
                        sampler.update_hidden_layer(&mut scratch)?;
                    }

                    acc.v_bias += &scratch.nodes().v;
                    acc.h_bias += &scratch.nodes().h;
                    for j in 0..h_size {
                        let h = scratch.nodes().h[j];
                        acc.sparse_bias[j] += -scratch.mu_star(j) * h.abs();
                        for i in 0..v_size {
                            acc.weight[(i, j)] += scratch.nodes().v[i] * h;
                        }
                    }
                    if has_precision {
                        for i in 0..v_size {
                            let v = scratch.nodes().v[i];
                            acc.v_square[i] += v * v / 2.0;
                        }
                    }
                    Ok(acc)
                },
            )
            .try_reduce(
                || MomentStats::zeros(v_size, h_size),
                |mut a, b| {
                    a.merge(&b);
                    Ok(a)
                },
            )?;

        stats.scale(1.0 / indexes.len() as f64);
        self.model_mean = stats;
        Ok(())
    }

    /// Negative phase, exact: a single enumeration pass accumulating the
    /// partition function and every moment family at once. The per-worker
    /// counters are seeded by linear offset, so the split is static.
    fn calc_model_mean_exact(&mut self, rbm: &Rbm) -> Result<()> {
        if rbm.hidden_domain().is_continuous() {
            return Err(BoltzError::NotDerived("exact model mean"));
        }
        let (v_size, h_size) = (rbm.v_size(), rbm.h_size());
        let has_sparse = rbm.params().has_sparse();
        let has_precision = rbm.params().has_precision();
        let values = rbm.scratch().enumerable_visible_values()?;
        let max_count = StateCounter::uniform(v_size, values.len())?.max_count();

        let (mut stats, z) = (0..max_count)
            .into_par_iter()
            .try_fold(
                || (MomentStats::zeros(v_size, h_size), 0.0f64),
                |(mut acc, mut z), c| -> Result<(MomentStats, f64)> {
                    let mut sc = StateCounter::uniform(v_size, values.len())?;
                    sc.set_count(c);
                    let mut scratch = rbm.scratch();
                    scratch.load_visible_state(sc.state(), &values);

                    let mu_vect = scratch.mu_vect();
                    let b_dot_v = scratch.nodes().v.dot(&rbm.params().b);
                    let weight = b_dot_v.exp() * scratch.hidden_normalizer_product(&mu_vect);
                    z += weight;

                    for i in 0..v_size {
                        let v = scratch.nodes().v[i];
                        acc.v_bias[i] += v * weight;
                        if has_precision {
                            acc.v_square[i] += v * v / 2.0 * weight;
                        }
                    }
                    for j in 0..h_size {
                        let act = scratch.act_hid_with(j, mu_vect[j]);
                        acc.h_bias[j] += weight * act;
                        for i in 0..v_size {
                            acc.weight[(i, j)] += scratch.nodes().v[i] * weight * act;
                        }
                        if has_sparse {
                            acc.sparse_bias[j] +=
                                weight * scratch.act_hid_sparse_with(j, mu_vect[j]);
                        }
                    }
                    Ok((acc, z))
                },
            )
            .try_reduce(
                || (MomentStats::zeros(v_size, h_size), 0.0),
                |(mut a, za), (b, zb)| {
                    a.merge(&b);
                    Ok((a, za + zb))
                },
            )?;

        let z = ensure_finite(z, "exact model mean")?;
        if z <= 0.0 {
            return Err(BoltzError::overflow(
                "exact model mean",
                format!("partition function = {z}"),
            ));
        }
        stats.scale(1.0 / z);
        self.model_mean = stats;
        Ok(())
    }

    /// Gradient = data mean − model mean, per family.
    fn calc_gradient(&mut self) {
        self.gradient.v_bias = &self.data_mean.v_bias - &self.model_mean.v_bias;
        self.gradient.h_bias = &self.data_mean.h_bias - &self.model_mean.h_bias;
        self.gradient.weight = &self.data_mean.weight - &self.model_mean.weight;
        self.gradient.sparse_bias = &self.data_mean.sparse_bias - &self.model_mean.sparse_bias;
        self.gradient.v_square = &self.data_mean.v_square - &self.model_mean.v_square;
    }

    /// Apply per-coordinate optimizer steps. The precision family is
    /// deliberately left untouched; its gradient is tracked but not applied.
    fn update_params(&mut self, rbm: &mut Rbm) {
        let (v_size, h_size) = (rbm.v_size(), rbm.h_size());
        let params = rbm.params_mut();

        for i in 0..v_size {
            params.b[i] += self
                .optimizer
                .visible_bias_delta(self.gradient.v_bias[i], i);
            for j in 0..h_size {
                params.w[(i, j)] += self
                    .optimizer
                    .weight_delta(self.gradient.weight[(i, j)], i, j);
            }
        }
        for j in 0..h_size {
            params.c[j] += self
                .optimizer
                .hidden_bias_delta(self.gradient.h_bias[j], j);
        }
        if let Some(sparse) = &mut params.sparse {
            for j in 0..h_size {
                sparse[j] += self
                    .optimizer
                    .sparse_delta(self.gradient.sparse_bias[j], j);
            }
        }
    }
}

/// Dataset log-likelihood with a single partition-function evaluation.
pub fn log_likelihood(rbm: &mut Rbm, dataset: &[DVector<f64>]) -> Result<f64> {
    let z = rbm.normal_constant()?;
    let mut value = 0.0;
    for data in dataset {
        let prob = rbm.prob_vis_with(data.as_slice(), z)?;
        value += prob.ln();
    }
    ensure_finite(value, "log_likelihood")
}
