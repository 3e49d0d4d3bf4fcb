//! Synthetic transaction stream

use crate::config::SimulationConfig;
use crate::error::{MonitorError, Result};
use crate::types::transaction::{Transaction, TransactionType};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;
use tracing::debug;

/// Anything that can feed transactions into the driver loop
pub trait TransactionSource {
    /// Produce the next transaction of the stream
    fn next_transaction(&mut self) -> Result<Transaction>;
}

/// Uniform random transaction generator
pub struct RandomTransactionGenerator<R: Rng = StdRng> {
    rng: R,
    amount: RangeInclusive<f64>,
    balance: RangeInclusive<f64>,
    generated: u64,
}

impl RandomTransactionGenerator<StdRng> {
    /// Build a generator from configuration.
    ///
    /// Seeds from `simulation.seed` when set, otherwise from OS entropy.
    pub fn from_config(config: &SimulationConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(
            rng,
            config.amount_min..=config.amount_max,
            config.balance_min..=config.balance_max,
        )
    }
}

impl<R: Rng> RandomTransactionGenerator<R> {
    /// Build a generator around an explicit random source
    pub fn with_rng(rng: R, amount: RangeInclusive<f64>, balance: RangeInclusive<f64>) -> Self {
        Self {
            rng,
            amount,
            balance,
            generated: 0,
        }
    }

    /// Number of transactions produced so far
    pub fn generated(&self) -> u64 {
        self.generated
    }

    fn draw(&mut self, range: &RangeInclusive<f64>, field: &str) -> Result<f64> {
        let (lo, hi) = (*range.start(), *range.end());
        if !lo.is_finite() || !hi.is_finite() || lo > hi || !(hi - lo).is_finite() {
            return Err(MonitorError::GenerationFailure(format!(
                "{} range [{}, {}] cannot be sampled",
                field, lo, hi
            )));
        }
        Ok(self.rng.gen_range(lo..=hi))
    }
}

impl<R: Rng> TransactionSource for RandomTransactionGenerator<R> {
    fn next_transaction(&mut self) -> Result<Transaction> {
        let amount_range = self.amount.clone();
        let balance_range = self.balance.clone();

        let amount = self.draw(&amount_range, "amount")?;
        let transaction_type = TransactionType::ALL[self.rng.gen_range(0..TransactionType::ALL.len())];
        let balance = self.draw(&balance_range, "balance")?;

        self.generated += 1;
        debug!(
            generated = self.generated,
            amount = amount,
            transaction_type = %transaction_type,
            balance = balance,
            "Generated transaction"
        );

        Ok(Transaction::new(amount, transaction_type, balance))
    }
}
