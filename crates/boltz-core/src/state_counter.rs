//! Mixed-radix enumeration of a discrete joint state space.
//!
//! A [`StateCounter`] walks every joint assignment of `n` variables, each
//! with its own finite cardinality, in a fixed counting order: digit 0 is
//! the most significant, the **last digit varies fastest**. The counter can
//! be seeded to an arbitrary offset, which is what lets enumeration sums be
//! split statically across workers.

use crate::error::{BoltzError, Result};

/// Counter over the Cartesian product of per-variable state indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateCounter {
    cardinalities: Vec<usize>,
    state: Vec<usize>,
    count: u64,
    max_count: u64,
}

impl StateCounter {
    /// Create a counter positioned at the all-zero state.
    ///
    /// Fails on an empty variable list or any zero cardinality; a zero-size
    /// state space has no well-defined enumeration.
    pub fn new(cardinalities: Vec<usize>) -> Result<Self> {
        if cardinalities.is_empty() {
            return Err(BoltzError::InvalidConfig(
                "state counter needs at least one variable".into(),
            ));
        }
        if cardinalities.iter().any(|&k| k == 0) {
            return Err(BoltzError::InvalidConfig(
                "state counter cardinalities must be positive".into(),
            ));
        }

        let mut max_count: u64 = 1;
        for &k in &cardinalities {
            max_count = max_count.checked_mul(k as u64).ok_or_else(|| {
                BoltzError::InvalidConfig("state space size overflows u64".into())
            })?;
        }

        let state = vec![0; cardinalities.len()];
        Ok(StateCounter {
            cardinalities,
            state,
            count: 0,
            max_count,
        })
    }

    /// Uniform cardinality for all `n` variables.
    pub fn uniform(n: usize, cardinality: usize) -> Result<Self> {
        Self::new(vec![cardinality; n])
    }

    /// Total number of joint states (product of all cardinalities).
    pub fn max_count(&self) -> u64 {
        self.max_count
    }

    /// Current linear offset in `0..max_count()`.
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Current digit vector; `state()[i]` is the state index of variable `i`.
    pub fn state(&self) -> &[usize] {
        &self.state
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.cardinalities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cardinalities.is_empty()
    }

    /// Advance to the next combination, wrapping to zero after the last one.
    pub fn advance(&mut self) {
        self.count = (self.count + 1) % self.max_count;
        // Ripple-carry from the fastest-varying (last) digit.
        for i in (0..self.state.len()).rev() {
            self.state[i] += 1;
            if self.state[i] < self.cardinalities[i] {
                return;
            }
            self.state[i] = 0;
        }
    }

    /// Seed the counter to an arbitrary offset.
    ///
    /// `set_count(c)` reproduces exactly the digit vector reached by `c`
    /// sequential [`advance`](Self::advance) calls from zero. Offsets wrap
    /// modulo [`max_count`](Self::max_count).
    pub fn set_count(&mut self, count: u64) {
        self.count = count % self.max_count;
        let mut rem = self.count;
        for i in (0..self.state.len()).rev() {
            let k = self.cardinalities[i] as u64;
            self.state[i] = (rem % k) as usize;
            rem /= k;
        }
    }
}
