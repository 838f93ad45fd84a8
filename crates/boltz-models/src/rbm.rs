//! Concrete machines and their scratch evaluators.
//!
//! [`Rbm`] owns parameters, node state, and domains; the classic family
//! members are constructor presets over the same struct rather than separate
//! types. [`RbmScratch`] borrows the parameters and domains but owns its own
//! node state, so parallel workers can evaluate conditionals and moments
//! against shared parameters without cloning them.

use boltz_core::{HiddenDomain, NodeState, RbmParams, Result, VisibleDomain};

use crate::model::EnergyModel;

/// A two-layer Boltzmann machine.
#[derive(Debug, Clone, PartialEq)]
pub struct Rbm {
    params: RbmParams,
    nodes: NodeState,
    visible: VisibleDomain,
    hidden: HiddenDomain,
}

impl Rbm {
    /// Build a machine from explicit parts. Layer sizes come from `params`.
    pub fn new(params: RbmParams, visible: VisibleDomain, hidden: HiddenDomain) -> Result<Self> {
        params.validate()?;
        visible.validate()?;
        let nodes = NodeState::zeros(params.v_size(), params.h_size());
        Ok(Rbm {
            params,
            nodes,
            visible,
            hidden,
        })
    }

    /// Binary-binary machine: visible and hidden both on `{0, 1}`.
    pub fn bernoulli(v_size: usize, h_size: usize) -> Self {
        Rbm {
            params: RbmParams::zeros(v_size, h_size),
            nodes: NodeState::zeros(v_size, h_size),
            visible: VisibleDomain::binary(),
            hidden: HiddenDomain::binary(),
        }
    }

    /// Gaussian visible layer (with per-unit precisions), binary hidden.
    pub fn gaussian_bernoulli(v_size: usize, h_size: usize) -> Self {
        Rbm {
            params: RbmParams::zeros(v_size, h_size).with_precision(),
            nodes: NodeState::zeros(v_size, h_size),
            visible: VisibleDomain::Gaussian,
            hidden: HiddenDomain::binary(),
        }
    }

    /// Generalized sparse machine: spin visible `{-1, +1}`, hidden on the
    /// `div_size`-way split of `[-1, 1]`, learned per-unit sparsity.
    pub fn generalized_sparse(v_size: usize, h_size: usize, div_size: usize) -> Result<Self> {
        Ok(Rbm {
            params: RbmParams::zeros(v_size, h_size).with_sparse(),
            nodes: NodeState::zeros(v_size, h_size),
            visible: VisibleDomain::spin(),
            hidden: HiddenDomain::discrete(-1.0, 1.0, div_size)?,
        })
    }

    /// Generalized sparse machine with continuous hidden units on `[-1, 1]`.
    pub fn generalized_sparse_continuous(v_size: usize, h_size: usize) -> Result<Self> {
        Ok(Rbm {
            params: RbmParams::zeros(v_size, h_size).with_sparse(),
            nodes: NodeState::zeros(v_size, h_size),
            visible: VisibleDomain::spin(),
            hidden: HiddenDomain::continuous(-1.0, 1.0)?,
        })
    }

    pub fn params_mut(&mut self) -> &mut RbmParams {
        &mut self.params
    }

    pub fn hidden_domain_mut(&mut self) -> &mut HiddenDomain {
        &mut self.hidden
    }

    /// Replace the parameter store (checkpoint restore). The node state is
    /// reset to zero if the layer sizes changed.
    pub fn set_params(&mut self, params: RbmParams) -> Result<()> {
        params.validate()?;
        if params.v_size() != self.nodes.v_size() || params.h_size() != self.nodes.h_size() {
            self.nodes = NodeState::zeros(params.v_size(), params.h_size());
        }
        self.params = params;
        Ok(())
    }

    /// A scratch evaluator sharing this machine's parameters and domains
    /// but owning an independent node state.
    pub fn scratch(&self) -> RbmScratch<'_> {
        RbmScratch {
            params: &self.params,
            visible: &self.visible,
            hidden: &self.hidden,
            nodes: self.nodes.clone(),
        }
    }
}

impl EnergyModel for Rbm {
    fn params(&self) -> &RbmParams {
        &self.params
    }

    fn nodes(&self) -> &NodeState {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut NodeState {
        &mut self.nodes
    }

    fn visible_domain(&self) -> &VisibleDomain {
        &self.visible
    }

    fn hidden_domain(&self) -> &HiddenDomain {
        &self.hidden
    }
}

/// Borrowed-parameter evaluator for parallel workers.
#[derive(Debug, Clone)]
pub struct RbmScratch<'a> {
    params: &'a RbmParams,
    visible: &'a VisibleDomain,
    hidden: &'a HiddenDomain,
    nodes: NodeState,
}

impl EnergyModel for RbmScratch<'_> {
    fn params(&self) -> &RbmParams {
        self.params
    }

    fn nodes(&self) -> &NodeState {
        &self.nodes
    }

    fn nodes_mut(&mut self) -> &mut NodeState {
        &mut self.nodes
    }

    fn visible_domain(&self) -> &VisibleDomain {
        self.visible
    }

    fn hidden_domain(&self) -> &HiddenDomain {
        self.hidden
    }
}
