//! Trainer behavior: gradient phases, determinism, and checkpoints.

use boltz_core::BoltzError;
use boltz_models::{EnergyModel, Rbm};
use boltz_train::{
    log_likelihood, Adam, GradientMode, ParamRecord, TrainRecord, Trainer, TrainerConfig,
};
use nalgebra::DVector;

fn binary_dataset() -> Vec<DVector<f64>> {
    vec![
        DVector::from_vec(vec![1.0, 1.0, 0.0]),
        DVector::from_vec(vec![1.0, 1.0, 0.0]),
        DVector::from_vec(vec![0.0, 0.0, 1.0]),
        DVector::from_vec(vec![1.0, 1.0, 0.0]),
    ]
}

#[test]
fn exact_training_increases_log_likelihood() {
    let mut rbm = Rbm::bernoulli(3, 2);
    let dataset = binary_dataset();
    let before = log_likelihood(&mut rbm, &dataset).unwrap();

    let config = TrainerConfig::default()
        .with_mode(GradientMode::Exact)
        .with_epochs(30)
        .with_batch_size(dataset.len())
        .with_learning_rate(0.1)
        .with_momentum_rate(0.5)
        .with_seed(5);
    let mut trainer = Trainer::momentum(config, &rbm);
    trainer.train(&mut rbm, &dataset).unwrap();

    let after = log_likelihood(&mut rbm, &dataset).unwrap();
    assert!(after > before, "before = {before}, after = {after}");
    assert_eq!(trainer.train_count(), 30);
}

#[test]
fn cd_zero_gradient_vanishes_on_clamped_data() {
    // With zero sweeps the negative chain never leaves the clamped data, so
    // both phases coincide and the step is a no-op.
    let mut rbm = Rbm::bernoulli(3, 2);
    rbm.params_mut().b[0] = 0.3;
    rbm.params_mut().w[(1, 1)] = -0.4;
    let before = rbm.params().clone();

    let dataset = binary_dataset();
    let config = TrainerConfig::default()
        .with_cd_k(0)
        .with_batch_size(dataset.len())
        .with_learning_rate(0.1);
    let mut trainer = Trainer::momentum(config, &rbm);
    trainer.train_once(&mut rbm, &dataset).unwrap();

    for i in 0..3 {
        assert!((rbm.params().b[i] - before.b[i]).abs() < 1e-12);
        for j in 0..2 {
            assert!((rbm.params().w[(i, j)] - before.w[(i, j)]).abs() < 1e-12);
        }
    }
}

#[test]
fn cd_training_is_reproducible_from_the_seed() {
    let dataset = binary_dataset();
    let run = || {
        let mut rbm = Rbm::bernoulli(3, 2);
        let config = TrainerConfig::default()
            .with_cd_k(1)
            .with_epochs(5)
            .with_batch_size(2)
            .with_seed(77);
        let mut trainer = Trainer::momentum(config, &rbm);
        trainer.train(&mut rbm, &dataset).unwrap();
        rbm.params().clone()
    };

    let (a, b) = (run(), run());
    // Chains are keyed per data point; only the float summation order can
    // differ between runs.
    for i in 0..3 {
        assert!((a.b[i] - b.b[i]).abs() < 1e-9);
        for j in 0..2 {
            assert!((a.w[(i, j)] - b.w[(i, j)]).abs() < 1e-9);
        }
    }
}

#[test]
fn oversized_batch_is_clamped_to_the_dataset() {
    let mut rbm = Rbm::bernoulli(3, 2);
    let dataset = binary_dataset();
    let config = TrainerConfig::default().with_batch_size(100).with_cd_k(1);
    let mut trainer = Trainer::momentum(config, &rbm);
    trainer.train_once(&mut rbm, &dataset).unwrap();
    assert_eq!(trainer.train_count(), 1);
}

#[test]
fn empty_dataset_is_rejected() {
    let mut rbm = Rbm::bernoulli(2, 1);
    let config = TrainerConfig::default();
    let mut trainer = Trainer::momentum(config, &rbm);
    let err = trainer.train_once(&mut rbm, &[]).unwrap_err();
    assert!(matches!(err, BoltzError::InvalidConfig(_)));
}

#[test]
fn exact_mode_refuses_a_continuous_hidden_domain() {
    let mut rbm = Rbm::generalized_sparse_continuous(2, 1).unwrap();
    let dataset = vec![DVector::from_vec(vec![1.0, -1.0])];
    let config = TrainerConfig::default()
        .with_mode(GradientMode::Exact)
        .with_batch_size(1);
    let mut trainer = Trainer::momentum(config, &rbm);
    let err = trainer.train_once(&mut rbm, &dataset).unwrap_err();
    assert!(matches!(err, BoltzError::NotDerived(_)));
}

#[test]
fn adam_training_moves_the_parameters() {
    let mut rbm = Rbm::generalized_sparse(2, 2, 2).unwrap();
    let dataset = vec![
        DVector::from_vec(vec![1.0, 1.0]),
        DVector::from_vec(vec![-1.0, -1.0]),
    ];
    let config = TrainerConfig::default()
        .with_mode(GradientMode::Exact)
        .with_epochs(3)
        .with_batch_size(2);
    let optimizer = Adam::new(rbm.v_size(), rbm.h_size(), 0.01);
    let mut trainer = Trainer::new(config, optimizer, &rbm);
    trainer.train(&mut rbm, &dataset).unwrap();

    assert!(rbm.params().w.iter().any(|&w| w != 0.0));
}

#[test]
fn checkpoint_roundtrips_the_whole_machine() {
    let mut rbm = Rbm::generalized_sparse(2, 2, 4).unwrap();
    rbm.params_mut().b[0] = 0.25;
    rbm.params_mut().c[1] = -0.75;
    rbm.params_mut().w[(0, 1)] = 0.125;
    rbm.params_mut().w[(1, 0)] = -0.5;
    rbm.params_mut().sparse.as_mut().unwrap()[0] = 0.375;

    let record = TrainRecord::new(&rbm, 12, 0.01, 0.9, 3, GradientMode::ContrastiveDivergence);
    let json = record.to_json().unwrap();
    let restored = TrainRecord::from_json(&json).unwrap();
    assert_eq!(restored.train_count, 12);
    assert_eq!(restored.cd_k, 3);

    let machine = restored.rbm.into_rbm().unwrap();
    assert_eq!(machine.params(), rbm.params());
    assert_eq!(machine.hidden_domain().div_size(), 4);
    assert_eq!(machine.visible_domain(), rbm.visible_domain());
}

#[test]
fn checkpoint_rejects_truncated_vectors() {
    let rbm = Rbm::bernoulli(3, 2);
    let mut record = ParamRecord::from_rbm(&rbm);
    record.v_bias.pop();
    assert!(matches!(
        record.into_rbm(),
        Err(BoltzError::DimensionMismatch { .. })
    ));

    let mut record = ParamRecord::from_rbm(&rbm);
    record.weight.push(0.0);
    assert!(record.into_rbm().is_err());
}

#[test]
fn checkpoint_rejects_unknown_versions() {
    let rbm = Rbm::bernoulli(2, 2);
    let mut record = TrainRecord::new(&rbm, 0, 0.01, 0.9, 1, GradientMode::Exact);
    record.version = 99;
    let json = serde_json::to_string(&record).unwrap();
    assert!(TrainRecord::from_json(&json).is_err());
}

#[test]
fn checkpoint_survives_a_file_roundtrip() {
    let rbm = Rbm::gaussian_bernoulli(2, 1);
    let record = TrainRecord::new(&rbm, 4, 0.05, 0.5, 2, GradientMode::ContrastiveDivergence);

    let path = std::env::temp_dir().join(format!("boltz-ckpt-{}.json", std::process::id()));
    record.save(&path).unwrap();
    let loaded = TrainRecord::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    assert_eq!(loaded, record);
    // A Gaussian record restores with no finite value set.
    let machine = loaded.rbm.into_rbm().unwrap();
    assert!(machine.visible_domain().values().is_none());
}
