//! Tests for fitting agents to simulated data.

use agent_fit::{
    AgentKind, Block, Dataset, FitConfig, FitMethod, ModelError, MultiStartNelderMead, Priors,
    ReversalTask, Rl, Table, Trial, Wrapper,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use statrs::distribution::Normal;

const TRUE_PARAMS: [f64; 2] = [-1.5, 1.2];

/// A reversal schedule: psi flips every `period` trials.
fn schedule(block_type: &str, n: usize, period: usize) -> Block {
    Block::new(
        (0..n)
            .map(|t| {
                let psi = if (t / period) % 2 == 0 { 0.8 } else { 0.2 };
                Trial::new()
                    .with("block_type", block_type)
                    .with("mag0", 1.0)
                    .with("mag1", 1.0)
                    .with("psi", psi)
            })
            .collect(),
    )
}

/// Splits a simulated table back into blocks of the given lengths.
fn to_dataset(table: &Table, blocks: &[(&str, usize)]) -> Dataset {
    let mut data = Dataset::new();
    let mut offset = 0;
    for &(id, len) in blocks {
        let trials = table.rows()[offset..offset + len].to_vec();
        data.insert(id.to_owned(), Block::new(trials));
        offset += len;
    }
    data
}

fn simulated_data() -> Dataset {
    let mut design = Dataset::new();
    design.insert("sta".into(), schedule("sta", 80, 40));
    design.insert("vol".into(), schedule("vol", 80, 20));
    let mut wrapper: Wrapper<Rl, ReversalTask> = Wrapper::new(ReversalTask);
    let mut rng = StdRng::seed_from_u64(2021);
    let table = wrapper.sim(&design, &TRUE_PARAMS, &mut rng).unwrap();
    to_dataset(&table, &[("sta", 80), ("vol", 80)])
}

#[test]
fn test_fit_beats_generating_params() {
    let data = simulated_data();
    let wrapper: Wrapper<Rl, ReversalTask> = Wrapper::new(ReversalTask);
    // The first start begins at the generating point, so the search can
    // only improve on it.
    let config = FitConfig {
        init: Some(TRUE_PARAMS.to_vec()),
        parallel: true,
        n_fits: 4,
        ..FitConfig::default()
    };
    let result = wrapper
        .fit(&data, &MultiStartNelderMead::new(), &config, None)
        .unwrap();

    let truth_loss = wrapper.loss_fn(&TRUE_PARAMS, &data, None).unwrap();
    assert!(result.loss <= truth_loss + 1e-6);
    assert!((result.log_like + result.loss).abs() < 1e-9);
    assert_eq!(result.n_obs, 160);
    assert_eq!(result.param_names, ["alpha", "beta"]);
    assert!(result.native_params[0] > 0.0 && result.native_params[0] < 1.0);
    assert!(result.native_params[1] > 0.0);
    assert!(result.log_post.is_none());
}

#[test]
fn test_init_is_used_for_first_start() {
    let data = simulated_data();
    let wrapper: Wrapper<Rl, ReversalTask> = Wrapper::new(ReversalTask);
    let config = FitConfig {
        init: Some(TRUE_PARAMS.to_vec()),
        max_iter: 0,
        ..FitConfig::default()
    };
    let result = wrapper
        .fit(&data, &MultiStartNelderMead::new(), &config, None)
        .unwrap();
    // Zero iterations: the best vertex of the initial simplex is returned
    let truth_loss = wrapper.loss_fn(&TRUE_PARAMS, &data, None).unwrap();
    assert!(result.loss <= truth_loss);
    assert_eq!(result.n_iter, 0);
}

#[test]
fn test_map_fit_needs_priors() {
    let data = simulated_data();
    let wrapper: Wrapper<Rl, ReversalTask> = Wrapper::new(ReversalTask);
    let config = FitConfig {
        method: FitMethod::Map,
        ..FitConfig::default()
    };
    let err = wrapper
        .fit(&data, &MultiStartNelderMead::new(), &config, None)
        .unwrap_err();
    assert!(matches!(err, ModelError::InvalidConfig(_)));
}

#[test]
fn test_map_fit_reports_posterior() {
    let data = simulated_data();
    let wrapper: Wrapper<Rl, ReversalTask> = Wrapper::new(ReversalTask);
    let priors: Priors = vec![
        Box::new(Normal::new(-1.0, 2.0).unwrap()),
        Box::new(Normal::new(0.0, 2.0).unwrap()),
    ];
    let config = FitConfig {
        method: FitMethod::Map,
        ..FitConfig::default()
    };
    let result = wrapper
        .fit(&data, &MultiStartNelderMead::new(), &config, Some(priors))
        .unwrap();
    let log_post = result.log_post.unwrap();
    assert!((log_post + result.loss).abs() < 1e-9);
}

#[test]
fn test_fit_through_registry() {
    let data = simulated_data();
    let kind: AgentKind = "RLasym".parse().unwrap();
    let config = FitConfig {
        max_iter: 50,
        ..FitConfig::default()
    };
    let result = kind
        .fit(ReversalTask, &data, &MultiStartNelderMead::new(), &config, None)
        .unwrap();
    assert_eq!(result.agent, "RLasym");
    assert_eq!(result.params.len(), kind.n_params());
    assert!(result.aic > 0.0 && result.bic > result.aic);

    let table = kind.eval(ReversalTask, &data, &result.params).unwrap();
    assert_eq!(table.len(), 160);
}
