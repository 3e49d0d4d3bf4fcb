//! Verdict inference on processed transactions

use crate::config::AppConfig;
use crate::error::{MonitorError, Result};
use crate::feature_extractor::FeatureExtractor;
use crate::models::reference::fit_reference_model;
use crate::models::AnomalyModel;
use crate::types::transaction::ProcessedRecord;
use crate::types::verdict::Verdict;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info};

/// Result of scoring one record
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PredictionResult {
    pub verdict: Verdict,
    /// Raw model score (higher = more anomalous)
    pub anomaly_score: f64,
}

/// Scores processed records with an owned, already-fitted anomaly model
pub struct InferenceEngine {
    model: Box<dyn AnomalyModel>,
    extractor: FeatureExtractor,
}

impl InferenceEngine {
    /// Train the reference model described by `config` and wrap it.
    ///
    /// Uses `model.seed` when set, otherwise OS entropy.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let mut rng = match config.model.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let forest = fit_reference_model(&config.model, &config.simulation, &mut rng)?;
        Ok(Self::with_model(forest))
    }

    /// Wrap an existing model, fitted or not
    pub fn with_model<M: AnomalyModel + 'static>(model: M) -> Self {
        info!(model = %model.name(), fitted = model.is_fitted(), "Inference engine initialized");
        Self {
            model: Box::new(model),
            extractor: FeatureExtractor::new(),
        }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_fitted()
    }

    /// Classify a processed record as legit or fraudulent.
    ///
    /// Only amount and balance reach the model. Fails with `ModelNotReady`
    /// when the model has not been fitted.
    pub fn score(&self, record: &ProcessedRecord) -> Result<PredictionResult> {
        if !self.model.is_fitted() {
            return Err(MonitorError::ModelNotReady);
        }

        let features = self.extractor.extract(record);
        let anomaly_score = self.model.anomaly_score(&features)?;
        let verdict = Verdict::from_outlier(self.model.predict(&features)?);

        debug!(
            model = %self.model.name(),
            amount = record.amount,
            balance = record.balance,
            anomaly_score = anomaly_score,
            verdict = %verdict,
            "Record scored"
        );

        Ok(PredictionResult {
            verdict,
            anomaly_score,
        })
    }
}
