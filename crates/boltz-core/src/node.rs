//! Layer state for a two-layer machine.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

/// Current visible and hidden unit values.
///
/// Samplers and the enumeration engine both write through this struct;
/// a model owns one, and scratch evaluators own their own copy so parallel
/// workers never share mutable state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeState {
    pub v: DVector<f64>,
    pub h: DVector<f64>,
}

impl NodeState {
    pub fn zeros(v_size: usize, h_size: usize) -> Self {
        NodeState {
            v: DVector::zeros(v_size),
            h: DVector::zeros(h_size),
        }
    }

    pub fn v_size(&self) -> usize {
        self.v.len()
    }

    pub fn h_size(&self) -> usize {
        self.h.len()
    }
}
