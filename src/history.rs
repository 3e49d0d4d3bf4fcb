//! In-memory history of scored transactions

use crate::types::transaction::ScoredTransaction;
use std::collections::VecDeque;
use tracing::trace;

/// Append-only, arrival-ordered store of scored transactions.
///
/// Unbounded by default. With a capacity it behaves as a ring buffer and
/// evicts the oldest entry first; the append/tail/filter contract does not
/// change.
#[derive(Debug, Clone, Default)]
pub struct HistoryStore {
    entries: VecDeque<ScoredTransaction>,
    capacity: Option<usize>,
    total_appended: u64,
}

impl HistoryStore {
    /// Create an unbounded store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that retains at most `capacity` entries (a zero capacity is treated as one)
    pub fn bounded(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity: Some(capacity),
            total_appended: 0,
        }
    }

    /// Bounded store when `capacity` is set, unbounded otherwise
    pub fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::new(),
        }
    }

    /// Append an entry, evicting the oldest one when the store is full
    pub fn append(&mut self, entry: ScoredTransaction) {
        if let Some(capacity) = self.capacity {
            while self.entries.len() >= capacity {
                if let Some(evicted) = self.entries.pop_front() {
                    trace!(sequence = evicted.sequence, "Evicted history entry");
                }
            }
        }
        self.entries.push_back(entry);
        self.total_appended += 1;
    }

    /// The last `n` entries in arrival order (fewer if the store holds fewer)
    pub fn tail(&self, n: usize) -> impl DoubleEndedIterator<Item = &ScoredTransaction> + ExactSizeIterator {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip)
    }

    /// Lazily yield entries matching `predicate` in arrival order
    pub fn filter<'a, P>(&'a self, mut predicate: P) -> impl Iterator<Item = &'a ScoredTransaction> + 'a
    where
        P: FnMut(&ScoredTransaction) -> bool + 'a,
    {
        self.entries.iter().filter(move |entry| predicate(*entry))
    }

    /// The last `n` entries matching `predicate`, in arrival order
    pub fn recent_matching<P>(&self, predicate: P, n: usize) -> Vec<&ScoredTransaction>
    where
        P: FnMut(&&ScoredTransaction) -> bool,
    {
        let mut recent: Vec<&ScoredTransaction> = self.entries.iter().rev().filter(predicate).take(n).collect();
        recent.reverse();
        recent
    }

    /// `(amount, balance)` for every retained entry, oldest first
    pub fn trend(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.entries.iter().map(|entry| (entry.amount, entry.balance))
    }

    /// Every retained entry, oldest first
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &ScoredTransaction> + ExactSizeIterator {
        self.entries.iter()
    }

    /// Retained entry at `index`, counting from the oldest
    pub fn get(&self, index: usize) -> Option<&ScoredTransaction> {
        self.entries.get(index)
    }

    /// Number of retained entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is retained
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries ever appended, including evicted ones
    pub fn total_appended(&self) -> u64 {
        self.total_appended
    }

    /// Retention limit, `None` when unbounded
    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }
}
