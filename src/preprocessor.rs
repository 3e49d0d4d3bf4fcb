//! Range clamping applied to every transaction before scoring

use crate::config::SimulationConfig;
use crate::types::transaction::{ProcessedRecord, Transaction};

/// Clamps numeric transaction fields into their valid ranges
#[derive(Debug, Clone)]
pub struct Preprocessor {
    amount_min: f64,
    amount_max: f64,
    balance_min: f64,
    balance_max: f64,
}

impl Preprocessor {
    pub fn new(amount: (f64, f64), balance: (f64, f64)) -> Self {
        Self {
            amount_min: amount.0,
            amount_max: amount.1,
            balance_min: balance.0,
            balance_max: balance.1,
        }
    }

    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(
            (config.amount_min, config.amount_max),
            (config.balance_min, config.balance_max),
        )
    }

    /// Clamp amount and balance; the transaction type passes through.
    pub fn preprocess(&self, tx: &Transaction) -> ProcessedRecord {
        ProcessedRecord {
            amount: clamp(tx.amount, self.amount_min, self.amount_max),
            transaction_type: tx.transaction_type,
            balance: clamp(tx.balance, self.balance_min, self.balance_max),
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::from_config(&SimulationConfig::default())
    }
}

// NaN maps to min; f64::max returns the non-NaN operand
fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}
