//! Anomaly model training and inference components

pub mod inference;
pub mod isolation_forest;
pub mod reference;

pub use inference::{InferenceEngine, PredictionResult};
pub use isolation_forest::{IsolationForest, IsolationForestParams};
pub use reference::fit_reference_model;

use crate::error::Result;

/// An unsupervised detector that separates inliers from outliers
pub trait AnomalyModel: Send + Sync {
    /// Train the model on reference data, one row per sample
    fn fit(&mut self, data: &[Vec<f64>]) -> Result<()>;

    /// Raw anomaly score (higher = more anomalous)
    fn anomaly_score(&self, sample: &[f64]) -> Result<f64>;

    /// Whether the sample is an outlier
    fn predict(&self, sample: &[f64]) -> Result<bool>;

    /// Model name for logs
    fn name(&self) -> &str;

    fn is_fitted(&self) -> bool;
}
