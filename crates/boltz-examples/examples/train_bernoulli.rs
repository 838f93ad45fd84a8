/// Binary machine training walkthrough:
/// 1. Build a Bernoulli machine
/// 2. Train it with CD-1 on a striped dataset
/// 3. Track the exact log-likelihood as it improves
/// 4. Save and reload a checkpoint
use anyhow::Result;
use boltz_examples::{init_tracing, striped_binary_dataset};
use boltz_models::{EnergyModel, Rbm};
use boltz_train::{log_likelihood, GradientMode, TrainRecord, Trainer, TrainerConfig};
use rand::SeedableRng;
use tracing::info;

fn main() -> Result<()> {
    init_tracing();

    let dataset = striped_binary_dataset(6, 10);
    let mut rbm = Rbm::bernoulli(6, 4);
    rbm.params_mut()
        .init_uniform(&mut rand_chacha::ChaCha8Rng::seed_from_u64(1), 0.1);

    let config = TrainerConfig::default()
        .with_mode(GradientMode::ContrastiveDivergence)
        .with_cd_k(1)
        .with_batch_size(dataset.len())
        .with_learning_rate(0.05)
        .with_momentum_rate(0.5)
        .with_seed(42);
    let mut trainer = Trainer::momentum(config.clone(), &rbm);

    info!(
        ll = log_likelihood(&mut rbm, &dataset)?,
        "log-likelihood before training"
    );

    for round in 0..10 {
        for _ in 0..20 {
            trainer.train_once(&mut rbm, &dataset)?;
        }
        info!(
            round,
            steps = trainer.train_count(),
            ll = log_likelihood(&mut rbm, &dataset)?,
            "training progress"
        );
    }

    let record = TrainRecord::new(
        &rbm,
        trainer.train_count(),
        config.learning_rate,
        config.momentum_rate,
        config.cd_k,
        config.mode,
    );
    let path = std::env::temp_dir().join("boltz-bernoulli.json");
    record.save(&path)?;
    let restored = TrainRecord::load(&path)?.rbm.into_rbm()?;
    info!(
        path = %path.display(),
        v_size = restored.v_size(),
        h_size = restored.h_size(),
        "checkpoint roundtrip ok"
    );

    Ok(())
}
