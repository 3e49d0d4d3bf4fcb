//! Transaction data structures for the simulated stream

use crate::types::verdict::Verdict;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    Credit,
    Debit,
}

impl TransactionType {
    pub const ALL: [TransactionType; 2] = [TransactionType::Credit, TransactionType::Debit];

    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Credit => "Credit",
            TransactionType::Debit => "Debit",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw transaction as emitted by a source, before any clamping
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Transaction amount
    pub amount: f64,
    /// Credit or debit
    pub transaction_type: TransactionType,
    /// Account balance after the transaction
    pub balance: f64,
}

impl Transaction {
    pub fn new(amount: f64, transaction_type: TransactionType, balance: f64) -> Self {
        Self {
            amount,
            transaction_type,
            balance,
        }
    }
}

/// A transaction with its numeric fields clamped into the valid ranges
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessedRecord {
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub balance: f64,
}

/// A scored transaction as kept in the history store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredTransaction {
    /// 1-based arrival index
    pub sequence: u64,
    pub amount: f64,
    pub transaction_type: TransactionType,
    pub balance: f64,
    pub status: Verdict,
    /// Raw isolation score, higher is more anomalous
    pub anomaly_score: f64,
    pub timestamp: DateTime<Utc>,
}

impl ScoredTransaction {
    /// Fold a processed record and its verdict into a history entry.
    ///
    /// The transaction type is taken from the original transaction.
    pub fn new(
        sequence: u64,
        original: &Transaction,
        processed: &ProcessedRecord,
        status: Verdict,
        anomaly_score: f64,
    ) -> Self {
        Self {
            sequence,
            amount: processed.amount,
            transaction_type: original.transaction_type,
            balance: processed.balance,
            status,
            anomaly_score,
            timestamp: Utc::now(),
        }
    }

    pub fn is_fraudulent(&self) -> bool {
        self.status.is_fraudulent()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scored_transaction_takes_processed_amounts() {
        let raw = Transaction::new(12_000.0, TransactionType::Debit, 50.0);
        let processed = ProcessedRecord {
            amount: 10_000.0,
            transaction_type: TransactionType::Debit,
            balance: 100.0,
        };

        let scored = ScoredTransaction::new(7, &raw, &processed, Verdict::Fraudulent, 0.71);

        assert_eq!(scored.sequence, 7);
        assert_eq!(scored.amount, 10_000.0);
        assert_eq!(scored.balance, 100.0);
        assert_eq!(scored.transaction_type, TransactionType::Debit);
        assert!(scored.is_fraudulent());
    }

    #[test]
    fn test_scored_transaction_serialization() {
        let raw = Transaction::new(250.0, TransactionType::Credit, 4_000.0);
        let processed = ProcessedRecord {
            amount: 250.0,
            transaction_type: TransactionType::Credit,
            balance: 4_000.0,
        };
        let scored = ScoredTransaction::new(1, &raw, &processed, Verdict::Legit, 0.42);

        let json = serde_json::to_string(&scored).unwrap();
        assert!(json.contains("\"transaction_type\":\"Credit\""));
        assert!(json.contains("\"status\":\"Legit\""));

        let deserialized: ScoredTransaction = serde_json::from_str(&json).unwrap();
        assert_eq!(scored, deserialized);
    }
}
