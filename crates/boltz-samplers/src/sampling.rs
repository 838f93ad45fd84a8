//! Chain driving and dataset generation.

use boltz_core::Result;
use boltz_models::EnergyModel;
use nalgebra::DVector;
use tracing::debug;

use crate::gibbs::GibbsSampler;
use crate::schedule::SamplingSchedule;

/// One Gibbs sweep: blocked visible update, then blocked hidden update.
pub fn sweep<M: EnergyModel>(model: &mut M, sampler: &mut GibbsSampler) -> Result<()> {
    sampler.update_visible_layer(model)?;
    sampler.update_hidden_layer(model)?;
    Ok(())
}

/// Run `n` sweeps from the model's current node state.
pub fn run_chain<M: EnergyModel>(
    model: &mut M,
    sampler: &mut GibbsSampler,
    n_sweeps: usize,
) -> Result<()> {
    for _ in 0..n_sweeps {
        sweep(model, sampler)?;
    }
    Ok(())
}

/// Collect visible configurations from a single chain under a schedule:
/// `n_warmup` sweeps, then one sample every `steps_per_sample` sweeps.
pub fn generate_dataset<M: EnergyModel>(
    model: &mut M,
    sampler: &mut GibbsSampler,
    schedule: &SamplingSchedule,
) -> Result<Vec<DVector<f64>>> {
    run_chain(model, sampler, schedule.n_warmup)?;

    let mut dataset = Vec::with_capacity(schedule.n_samples);
    for _ in 0..schedule.n_samples {
        run_chain(model, sampler, schedule.steps_per_sample)?;
        dataset.push(model.nodes().v.clone());
    }

    debug!(
        n_samples = dataset.len(),
        total_sweeps = schedule.total_sweeps(),
        "generated dataset from gibbs chain"
    );
    Ok(dataset)
}
