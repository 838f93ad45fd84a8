//! Versioned JSON checkpoints.
//!
//! [`ParamRecord`] captures a machine completely: layer sizes, flat
//! parameter vectors, the optional sparse/precision families, and the
//! domain configuration. [`TrainRecord`] wraps it with the trainer's
//! bookkeeping so an interrupted run restarts at the same step. Restore
//! validates the version and every vector length before any value is used.

use boltz_core::{BoltzError, HiddenDomain, RbmParams, Result, VisibleDomain};
use boltz_models::{EnergyModel, Rbm};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::trainer::GradientMode;

pub const CHECKPOINT_VERSION: u32 = 1;

/// A machine's full parameterization, flattened for serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParamRecord {
    pub version: u32,
    pub v_size: usize,
    pub h_size: usize,
    pub v_bias: Vec<f64>,
    pub h_bias: Vec<f64>,
    /// Row-major `v_size × h_size`.
    pub weight: Vec<f64>,
    pub sparse: Option<Vec<f64>>,
    pub precision: Option<Vec<f64>>,
    /// Finite visible value set; `None` for a Gaussian visible layer.
    pub visible_values: Option<Vec<f64>>,
    pub h_min: f64,
    pub h_max: f64,
    pub div_size: usize,
    /// Continuous hidden domain flag.
    pub real_flag: bool,
}

impl ParamRecord {
    pub fn from_rbm(rbm: &Rbm) -> Self {
        let params = rbm.params();
        let hidden = rbm.hidden_domain();
        let mut weight = Vec::with_capacity(params.v_size() * params.h_size());
        for i in 0..params.v_size() {
            for j in 0..params.h_size() {
                weight.push(params.w[(i, j)]);
            }
        }
        ParamRecord {
            version: CHECKPOINT_VERSION,
            v_size: params.v_size(),
            h_size: params.h_size(),
            v_bias: params.b.iter().copied().collect(),
            h_bias: params.c.iter().copied().collect(),
            weight,
            sparse: params.sparse.as_ref().map(|s| s.iter().copied().collect()),
            precision: params.precision.as_ref().map(|p| p.iter().copied().collect()),
            visible_values: rbm.visible_domain().values().map(|v| v.to_vec()),
            h_min: hidden.h_min(),
            h_max: hidden.h_max(),
            div_size: hidden.div_size(),
            real_flag: hidden.is_continuous(),
        }
    }

    /// Rebuild the machine. Rejects unknown versions and any vector whose
    /// length disagrees with the declared sizes.
    pub fn into_rbm(self) -> Result<Rbm> {
        if self.version != CHECKPOINT_VERSION {
            return Err(BoltzError::InvalidConfig(format!(
                "unknown checkpoint version {}, expected {CHECKPOINT_VERSION}",
                self.version
            )));
        }
        if self.v_bias.len() != self.v_size {
            return Err(BoltzError::dims("checkpoint v_bias", self.v_size, self.v_bias.len()));
        }
        if self.h_bias.len() != self.h_size {
            return Err(BoltzError::dims("checkpoint h_bias", self.h_size, self.h_bias.len()));
        }
        if self.weight.len() != self.v_size * self.h_size {
            return Err(BoltzError::dims(
                "checkpoint weight",
                self.v_size * self.h_size,
                self.weight.len(),
            ));
        }
        if let Some(sparse) = &self.sparse {
            if sparse.len() != self.h_size {
                return Err(BoltzError::dims("checkpoint sparse", self.h_size, sparse.len()));
            }
        }
        if let Some(precision) = &self.precision {
            if precision.len() != self.v_size {
                return Err(BoltzError::dims(
                    "checkpoint precision",
                    self.v_size,
                    precision.len(),
                ));
            }
        }

        let mut params = RbmParams::zeros(self.v_size, self.h_size);
        params.b = DVector::from_vec(self.v_bias);
        params.c = DVector::from_vec(self.h_bias);
        params.w = DMatrix::from_row_slice(self.v_size, self.h_size, &self.weight);
        params.sparse = self.sparse.map(DVector::from_vec);
        params.precision = self.precision.map(DVector::from_vec);

        let visible = match self.visible_values {
            Some(values) => VisibleDomain::Finite(values),
            None => VisibleDomain::Gaussian,
        };
        let hidden = if self.real_flag {
            HiddenDomain::continuous(self.h_min, self.h_max)?
        } else {
            HiddenDomain::discrete(self.h_min, self.h_max, self.div_size)?
        };

        Rbm::new(params, visible, hidden)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// A full training snapshot: machine plus trainer bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainRecord {
    pub version: u32,
    pub rbm: ParamRecord,
    pub train_count: usize,
    pub learning_rate: f64,
    pub momentum_rate: f64,
    pub cd_k: usize,
    pub mode: GradientMode,
}

impl TrainRecord {
    pub fn new(
        rbm: &Rbm,
        train_count: usize,
        learning_rate: f64,
        momentum_rate: f64,
        cd_k: usize,
        mode: GradientMode,
    ) -> Self {
        TrainRecord {
            version: CHECKPOINT_VERSION,
            rbm: ParamRecord::from_rbm(rbm),
            train_count,
            learning_rate,
            momentum_rate,
            cd_k,
            mode,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.version != CHECKPOINT_VERSION {
            return Err(BoltzError::InvalidConfig(format!(
                "unknown checkpoint version {}, expected {CHECKPOINT_VERSION}",
                self.version
            )));
        }
        Ok(())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let record: TrainRecord = serde_json::from_str(json)?;
        record.validate()?;
        Ok(record)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }
}
