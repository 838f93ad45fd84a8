/// Model recovery measured in KL divergence:
/// 1. Fix a source machine with known parameters
/// 2. Sample a dataset from it by blocked Gibbs sampling
/// 3. Train a fresh machine on that dataset with the exact gradient
/// 4. Watch KL(source ‖ recovered) shrink
use anyhow::Result;
use boltz_examples::init_tracing;
use boltz_models::{kld, Rbm};
use boltz_samplers::{generate_dataset, GibbsSampler, RngKey, SamplingSchedule};
use boltz_train::{GradientMode, Trainer, TrainerConfig};
use tracing::info;

fn main() -> Result<()> {
    init_tracing();

    let mut source = Rbm::generalized_sparse(4, 2, 2)?;
    source.params_mut().b[0] = 0.5;
    source.params_mut().b[3] = -0.5;
    source.params_mut().w[(0, 0)] = 0.8;
    source.params_mut().w[(1, 0)] = 0.8;
    source.params_mut().w[(2, 1)] = -0.6;
    source.params_mut().sparse.as_mut().unwrap()[0] = 0.3;

    let schedule = SamplingSchedule::new(500, 200, 5);
    let mut sampler = GibbsSampler::new(RngKey::new(7));
    let dataset = generate_dataset(&mut source.clone(), &mut sampler, &schedule)?;
    info!(n = dataset.len(), "sampled training data from the source");

    let mut recovered = Rbm::generalized_sparse(4, 2, 2)?;
    let config = TrainerConfig::default()
        .with_mode(GradientMode::Exact)
        .with_batch_size(dataset.len())
        .with_learning_rate(0.05)
        .with_momentum_rate(0.5)
        .with_seed(13);
    let mut trainer = Trainer::momentum(config, &recovered);

    let initial = kld(&mut source, &mut recovered)?;
    info!(kl = initial, "divergence before training");

    let mut last = initial;
    for round in 0..8 {
        for _ in 0..25 {
            trainer.train_once(&mut recovered, &dataset)?;
        }
        last = kld(&mut source, &mut recovered)?;
        info!(round, kl = last, "divergence after training round");
    }

    info!(initial, final_kl = last, "kl recovery finished");
    Ok(())
}
