//! # boltz-core
//!
//! Core types for the boltz Boltzmann machine library.
//!
//! This crate provides the shared foundations the model, sampler, and
//! training crates build on:
//!
//! - [`RbmParams`]: Dense parameter store (biases, couplings, optional
//!   sparsity biases and Gaussian precisions)
//! - [`NodeState`]: Visible and hidden layer values
//! - [`VisibleDomain`] / [`HiddenDomain`]: Admissible unit values, including
//!   the discretized hidden split of the generalized family
//! - [`StateCounter`]: Mixed-radix enumeration of finite joint state spaces,
//!   seedable for static work splitting
//! - [`BoltzError`]: Error taxonomy shared by every crate in the workspace
//!
//! ## Enumeration
//!
//! Exact operations (partition functions, moments, divergences) walk the
//! full visible state space with a [`StateCounter`]:
//!
//! ```rust
//! use boltz_core::StateCounter;
//!
//! let mut counter = StateCounter::uniform(3, 2).unwrap();
//! for _ in 0..counter.max_count() {
//!     let _digits = counter.state();
//!     counter.advance();
//! }
//! ```

pub mod domain;
pub mod error;
pub mod node;
pub mod parameter;
pub mod state_counter;

pub use domain::{HiddenDomain, HiddenKind, VisibleDomain};
pub use error::{ensure_finite, BoltzError, Result};
pub use node::NodeState;
pub use parameter::RbmParams;
pub use state_counter::StateCounter;
