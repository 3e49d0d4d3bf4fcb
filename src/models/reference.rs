//! Reference model training on a synthetic sample

use crate::config::{check_range, ModelConfig, SimulationConfig};
use crate::error::Result;
use crate::models::isolation_forest::{IsolationForest, IsolationForestParams};
use rand::Rng;
use tracing::info;

/// Draw `size` independent `[amount, balance]` rows from the configured ranges.
///
/// The transaction type is not part of the sample. Ranges that cannot be
/// sampled uniformly are rejected as `InvalidConfig`.
pub fn reference_sample<R: Rng>(
    rng: &mut R,
    size: usize,
    simulation: &SimulationConfig,
) -> Result<Vec<Vec<f64>>> {
    check_range("simulation.amount", simulation.amount_min, simulation.amount_max)?;
    check_range("simulation.balance", simulation.balance_min, simulation.balance_max)?;

    Ok((0..size)
        .map(|_| {
            vec![
                rng.gen_range(simulation.amount_min..=simulation.amount_max),
                rng.gen_range(simulation.balance_min..=simulation.balance_max),
            ]
        })
        .collect())
}

/// Fit the isolation forest used for the whole run.
///
/// Both the reference sample and the tree growth draw from `rng`, so a
/// seeded source reproduces the same model.
pub fn fit_reference_model<R: Rng>(
    model: &ModelConfig,
    simulation: &SimulationConfig,
    rng: &mut R,
) -> Result<IsolationForest> {
    let sample = reference_sample(rng, model.training_samples, simulation)?;

    let mut forest = IsolationForest::new(IsolationForestParams {
        n_estimators: model.n_estimators,
        max_samples: model.max_samples,
        contamination: model.contamination,
        seed: model.seed,
    });
    forest.fit_with_rng(&sample, rng)?;

    info!(
        training_samples = sample.len(),
        contamination = model.contamination,
        "Reference model trained"
    );

    Ok(forest)
}
