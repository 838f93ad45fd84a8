//! # boltz-train
//!
//! Gradient training for the boltz machine family.
//!
//! - [`Trainer`]: mini-batch trainer; the negative phase is either
//!   contrastive divergence (parallel per-point chains, reproducible via
//!   key splitting) or the exact gradient (one combined enumeration pass)
//! - [`Optimizer`] with [`Momentum`] and [`Adam`] implementations
//! - [`MomentStats`]: per-family moment accumulators shared by both phases
//! - [`ParamRecord`] / [`TrainRecord`]: versioned JSON checkpoints with
//!   strict restore-time validation
//! - [`log_likelihood`]: dataset log-likelihood with one partition-function
//!   evaluation

pub mod checkpoint;
pub mod optimizer;
pub mod stats;
pub mod trainer;

pub use checkpoint::{ParamRecord, TrainRecord, CHECKPOINT_VERSION};
pub use optimizer::{Adam, Momentum, Optimizer};
pub use stats::MomentStats;
pub use trainer::{log_likelihood, GradientMode, Trainer, TrainerConfig};
