//! # boltz-models
//!
//! The Boltzmann machine family with exact inference over finite visible
//! domains.
//!
//! One struct, [`Rbm`], covers the whole family through its domain and
//! parameter configuration:
//!
//! - [`Rbm::bernoulli`]: binary visible and hidden units on `{0, 1}`
//! - [`Rbm::gaussian_bernoulli`]: Gaussian visible layer, binary hidden
//! - [`Rbm::generalized_sparse`]: spin visible, discretized hidden interval,
//!   learned per-unit sparsity
//! - [`Rbm::generalized_sparse_continuous`]: same, with continuous hidden
//!   units and closed-form local integrals
//!
//! All inference lives on the [`EnergyModel`] trait: conditionals,
//! activations, partition function by exhaustive enumeration, exact moments,
//! and the free energy. [`RbmScratch`] is a borrowed-parameter evaluator
//! for parallel workers, and [`kld`] computes the exact KL divergence
//! between two machines over the same visible space.

pub mod divergence;
pub mod math;
pub mod model;
pub mod rbm;

pub use divergence::kld;
pub use model::EnergyModel;
pub use rbm::{Rbm, RbmScratch};
