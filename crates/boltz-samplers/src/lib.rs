//! # boltz-samplers
//!
//! Blocked Gibbs sampling for the boltz machine family.
//!
//! - [`RngKey`]: functional key splitting (JAX style) so every chain is
//!   reproducible from a single seed
//! - [`GibbsSampler`]: per-unit and blocked layer updates for every
//!   visible/hidden domain combination, including the inverse-CDF draw for
//!   continuous hidden units
//! - [`SamplingSchedule`] + [`generate_dataset`]: warmup / thinning control
//!   for collecting visible configurations from a chain

pub mod gibbs;
pub mod rng;
pub mod sampling;
pub mod schedule;

pub use gibbs::GibbsSampler;
pub use rng::RngKey;
pub use sampling::{generate_dataset, run_chain, sweep};
pub use schedule::SamplingSchedule;
