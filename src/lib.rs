//! Fraud Stream Monitor Library
//!
//! Simulates a stream of financial transactions, scores each one with an
//! isolation forest trained at startup and renders a live dashboard of the
//! latest entries, the amount/balance trend and recent fraudulent entries.

pub mod config;
pub mod driver;
pub mod error;
pub mod feature_extractor;
pub mod generator;
pub mod history;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod preprocessor;
pub mod presenter;
pub mod types;

pub use config::AppConfig;
pub use driver::{Driver, DriverState, RunSummary};
pub use error::MonitorError;
pub use generator::{RandomTransactionGenerator, TransactionSource};
pub use history::HistoryStore;
pub use models::inference::InferenceEngine;
pub use preprocessor::Preprocessor;
pub use presenter::{Presenter, Snapshot};
pub use types::{ScoredTransaction, Transaction, TransactionType, Verdict};
