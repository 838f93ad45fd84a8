//! Collection schedules for Gibbs chains.

use serde::{Deserialize, Serialize};

/// How a chain is thinned into a dataset: discard `n_warmup` sweeps, then
/// keep one visible configuration every `steps_per_sample` sweeps until
/// `n_samples` are collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingSchedule {
    pub n_warmup: usize,
    pub n_samples: usize,
    pub steps_per_sample: usize,
}

impl SamplingSchedule {
    /// A zero thinning interval would collect the same state twice, so it is
    /// clamped to one.
    pub fn new(n_warmup: usize, n_samples: usize, steps_per_sample: usize) -> Self {
        SamplingSchedule {
            n_warmup,
            n_samples,
            steps_per_sample: steps_per_sample.max(1),
        }
    }

    /// Total sweeps the chain runs under this schedule.
    pub fn total_sweeps(&self) -> usize {
        self.n_warmup + self.n_samples * self.steps_per_sample
    }
}

impl Default for SamplingSchedule {
    fn default() -> Self {
        SamplingSchedule::new(1000, 100, 10)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_thinning_is_clamped() {
        let schedule = SamplingSchedule::new(5, 3, 0);
        assert_eq!(schedule.steps_per_sample, 1);
    }

    #[test]
    fn total_sweeps_counts_warmup_and_thinning() {
        let schedule = SamplingSchedule::new(500, 200, 5);
        assert_eq!(schedule.total_sweeps(), 1500);
    }
}
