//! Feature extraction for anomaly model inference.
//!
//! The transaction type is deliberately absent from the feature vector:
//! the model is trained on amount and balance only.

use crate::types::transaction::ProcessedRecord;

/// Number of features fed to the model
pub const FEATURE_COUNT: usize = 2;

/// Transforms processed records into model input features.
///
/// Features are extracted in the same order used to build the training sample.
pub struct FeatureExtractor;

impl FeatureExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Extract `[amount, balance]` from a processed record
    pub fn extract(&self, record: &ProcessedRecord) -> [f64; FEATURE_COUNT] {
        [record.amount, record.balance]
    }

    pub fn feature_count(&self) -> usize {
        FEATURE_COUNT
    }

    pub fn feature_names(&self) -> Vec<&'static str> {
        vec!["amount", "balance"]
    }
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::TransactionType;

    #[test]
    fn test_feature_extraction() {
        let extractor = FeatureExtractor::new();
        let record = ProcessedRecord {
            amount: 42.0,
            transaction_type: TransactionType::Debit,
            balance: 1_000.0,
        };

        let features = extractor.extract(&record);

        assert_eq!(features.len(), extractor.feature_count());
        assert_eq!(features, [42.0, 1_000.0]);
    }

    #[test]
    fn test_transaction_type_not_a_feature() {
        let extractor = FeatureExtractor::new();
        let credit = ProcessedRecord {
            amount: 5.0,
            transaction_type: TransactionType::Credit,
            balance: 100.0,
        };
        let debit = ProcessedRecord {
            transaction_type: TransactionType::Debit,
            ..credit
        };
        assert_eq!(extractor.extract(&credit), extractor.extract(&debit));
        assert_eq!(extractor.feature_names().len(), FEATURE_COUNT);
    }
}
