//! Value domains for visible and hidden units.
//!
//! The hidden domain caches its discretized value set; every setter that
//! touches `h_min`, `h_max`, or `div_size` rebuilds the cache, so callers
//! can never observe a stale split.

use serde::{Deserialize, Serialize};

use crate::error::{BoltzError, Result};

/// Admissible values of a visible unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VisibleDomain {
    /// A finite ordered value set; the enumeration engine walks
    /// `values.len() ^ visible_size` joint states.
    Finite(Vec<f64>),
    /// Continuous Gaussian units (precision held in the parameter store).
    /// Enumeration-based operations are undefined for this domain.
    Gaussian,
}

impl VisibleDomain {
    /// The standard binary domain `{0, 1}`.
    pub fn binary() -> Self {
        VisibleDomain::Finite(vec![0.0, 1.0])
    }

    /// The spin domain `{-1, +1}` used by the generalized family.
    pub fn spin() -> Self {
        VisibleDomain::Finite(vec![-1.0, 1.0])
    }

    /// Per-unit cardinality, if the domain is finite.
    pub fn cardinality(&self) -> Option<usize> {
        match self {
            VisibleDomain::Finite(values) => Some(values.len()),
            VisibleDomain::Gaussian => None,
        }
    }

    /// The ordered value set, if the domain is finite.
    pub fn values(&self) -> Option<&[f64]> {
        match self {
            VisibleDomain::Finite(values) => Some(values),
            VisibleDomain::Gaussian => None,
        }
    }

    pub fn is_finite(&self) -> bool {
        matches!(self, VisibleDomain::Finite(_))
    }

    /// Validate that a finite domain is non-empty.
    pub fn validate(&self) -> Result<()> {
        match self {
            VisibleDomain::Finite(values) if values.is_empty() => Err(
                BoltzError::InvalidConfig("finite visible domain must be non-empty".into()),
            ),
            _ => Ok(()),
        }
    }
}

/// How hidden units realize their values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HiddenKind {
    /// Finite split of `[h_min, h_max]` into `div_size` equal intervals
    /// (inclusive endpoints, `div_size + 1` values). Binary `{0, 1}` is the
    /// `div_size = 1` split of `[0, 1]`.
    Discrete,
    /// Continuous on `[h_min, h_max]`; local normalizers and activations use
    /// closed-form integrals split at zero.
    Continuous,
}

/// Hidden-unit value domain with a cached discretization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenDomain {
    kind: HiddenKind,
    h_min: f64,
    h_max: f64,
    div_size: usize,
    /// Cached value set; rebuilt whenever `h_min`, `h_max`, or `div_size`
    /// changes. Empty for the continuous kind.
    #[serde(skip, default)]
    values: Vec<f64>,
}

impl HiddenDomain {
    /// Binary hidden units `{0, 1}`.
    pub fn binary() -> Self {
        Self::discrete(0.0, 1.0, 1).expect("binary split is always valid")
    }

    /// Discretized hidden units on `[h_min, h_max]` with `div_size` intervals.
    pub fn discrete(h_min: f64, h_max: f64, div_size: usize) -> Result<Self> {
        if div_size == 0 {
            return Err(BoltzError::InvalidConfig(
                "hidden div_size must be positive".into(),
            ));
        }
        if !(h_min < h_max) {
            return Err(BoltzError::InvalidConfig(format!(
                "hidden range must satisfy h_min < h_max, got [{h_min}, {h_max}]"
            )));
        }
        let mut domain = HiddenDomain {
            kind: HiddenKind::Discrete,
            h_min,
            h_max,
            div_size,
            values: Vec::new(),
        };
        domain.rebuild();
        Ok(domain)
    }

    /// Continuous hidden units on `[h_min, h_max]`.
    pub fn continuous(h_min: f64, h_max: f64) -> Result<Self> {
        if !(h_min < h_max) {
            return Err(BoltzError::InvalidConfig(format!(
                "hidden range must satisfy h_min < h_max, got [{h_min}, {h_max}]"
            )));
        }
        Ok(HiddenDomain {
            kind: HiddenKind::Continuous,
            h_min,
            h_max,
            div_size: 1,
            values: Vec::new(),
        })
    }

    pub fn kind(&self) -> HiddenKind {
        self.kind
    }

    pub fn is_continuous(&self) -> bool {
        self.kind == HiddenKind::Continuous
    }

    pub fn h_min(&self) -> f64 {
        self.h_min
    }

    pub fn h_max(&self) -> f64 {
        self.h_max
    }

    pub fn div_size(&self) -> usize {
        self.div_size
    }

    /// The discretized value set. Empty for a continuous domain.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Number of admissible discrete values (`div_size + 1`).
    pub fn value_count(&self) -> usize {
        self.values.len()
    }

    pub fn set_h_min(&mut self, value: f64) {
        self.h_min = value;
        self.rebuild();
    }

    pub fn set_h_max(&mut self, value: f64) {
        self.h_max = value;
        self.rebuild();
    }

    pub fn set_div_size(&mut self, div_size: usize) {
        self.div_size = div_size.max(1);
        self.rebuild();
    }

    /// Recompute the cached split of `[h_min, h_max]`.
    fn rebuild(&mut self) {
        self.values.clear();
        if self.kind == HiddenKind::Continuous {
            return;
        }
        let div = self.div_size as f64;
        for i in 0..=self.div_size {
            let t = i as f64 / div;
            self.values.push(self.h_min + t * (self.h_max - self.h_min));
        }
    }

    /// Rebuild the cache after deserialization (the cache is not serialized).
    pub fn refresh(&mut self) {
        self.rebuild();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_split_is_zero_one() {
        let dom = HiddenDomain::binary();
        assert_eq!(dom.values(), &[0.0, 1.0]);
    }

    #[test]
    fn split_has_inclusive_endpoints() {
        let dom = HiddenDomain::discrete(-1.0, 1.0, 4).unwrap();
        assert_eq!(dom.value_count(), 5);
        assert_eq!(dom.values()[0], -1.0);
        assert_eq!(dom.values()[4], 1.0);
        assert!((dom.values()[2] - 0.0).abs() < 1e-15);
    }

    #[test]
    fn setters_invalidate_the_cache() {
        let mut dom = HiddenDomain::discrete(0.0, 1.0, 1).unwrap();
        dom.set_div_size(2);
        assert_eq!(dom.values(), &[0.0, 0.5, 1.0]);
        dom.set_h_min(-1.0);
        assert_eq!(dom.values(), &[-1.0, 0.0, 1.0]);
        dom.set_h_max(3.0);
        assert_eq!(dom.values(), &[-1.0, 1.0, 3.0]);
    }

    #[test]
    fn continuous_has_no_value_set() {
        let dom = HiddenDomain::continuous(-1.0, 1.0).unwrap();
        assert!(dom.values().is_empty());
        assert!(dom.is_continuous());
    }

    #[test]
    fn rejects_degenerate_ranges() {
        assert!(HiddenDomain::discrete(1.0, 1.0, 2).is_err());
        assert!(HiddenDomain::discrete(0.0, 1.0, 0).is_err());
        assert!(HiddenDomain::continuous(2.0, -2.0).is_err());
    }
}
