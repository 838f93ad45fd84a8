//! Exact divergences between machines over the same visible space.

use boltz_core::{BoltzError, Result, StateCounter};
use tracing::debug;

use crate::model::EnergyModel;

/// Kullback-Leibler divergence `KL(p ‖ q) = Σ_v p(v)·ln(p(v)/q(v))` by
/// exhaustive enumeration of `p`'s visible domain.
///
/// Both partition functions are computed once and reused across all
/// `|domain|^v_size` terms. A non-finite accumulator fails with a
/// diagnostic carrying the offending probabilities and both partition
/// functions.
pub fn kld<P, Q>(p: &mut P, q: &mut Q) -> Result<f64>
where
    P: EnergyModel,
    Q: EnergyModel,
{
    if p.v_size() != q.v_size() {
        return Err(BoltzError::dims("kld visible size", p.v_size(), q.v_size()));
    }

    let values = p.enumerable_visible_values()?;
    let z1 = p.normal_constant()?;
    let z2 = q.normal_constant()?;
    debug!(z1, z2, "computed partition functions for kl divergence");

    let mut sc = StateCounter::uniform(p.v_size(), values.len())?;
    let mut data = vec![0.0; p.v_size()];
    let mut value = 0.0;
    for _ in 0..sc.max_count() {
        for (slot, &digit) in data.iter_mut().zip(sc.state()) {
            *slot = values[digit];
        }
        let p1 = p.prob_vis_with(&data, z1)?;
        let p2 = q.prob_vis_with(&data, z2)?;
        value += p1 * (p1 / p2).ln();

        if !value.is_finite() {
            return Err(BoltzError::overflow(
                "kl_divergence",
                format!("accumulator = {value}, p1 = {p1}, p2 = {p2}, z1 = {z1}, z2 = {z2}"),
            ));
        }
        sc.advance();
    }

    Ok(value)
}
