//! Type definitions for the fraud stream monitor

pub mod transaction;
pub mod verdict;

pub use transaction::{ProcessedRecord, ScoredTransaction, Transaction, TransactionType};
pub use verdict::Verdict;
