//! Run statistics for the monitoring loop.

use crate::types::verdict::Verdict;
use std::time::{Duration, Instant};
use tracing::info;

const MAX_SAMPLES: usize = 10_000;

/// Counters and latency samples collected by the driver
pub struct PipelineMetrics {
    /// Ticks attempted, successful or not
    pub ticks: u64,
    /// Transactions scored and appended
    pub transactions_scored: u64,
    pub fraudulent: u64,
    /// Ticks dropped because scoring failed
    pub scoring_failures: u64,
    pub presentation_failures: u64,
    /// Ticks whose work took longer than the tick interval
    pub overruns: u64,
    /// Scoring times in microseconds
    scoring_times: Vec<u64>,
    /// Anomaly score distribution buckets
    score_buckets: [u64; 10],
    start_time: Instant,
}

impl PipelineMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            ticks: 0,
            transactions_scored: 0,
            fraudulent: 0,
            scoring_failures: 0,
            presentation_failures: 0,
            overruns: 0,
            scoring_times: Vec::with_capacity(1000),
            score_buckets: [0; 10],
            start_time: Instant::now(),
        }
    }

    /// Record an attempted tick
    pub fn record_tick(&mut self) {
        self.ticks += 1;
    }

    /// Record a scored transaction
    pub fn record_scored(&mut self, scoring_time: Duration, anomaly_score: f64, verdict: Verdict) {
        self.transactions_scored += 1;
        if verdict.is_fraudulent() {
            self.fraudulent += 1;
        }

        self.scoring_times.push(scoring_time.as_micros() as u64);
        // Keep only the most recent samples
        if self.scoring_times.len() > MAX_SAMPLES {
            self.scoring_times.drain(0..MAX_SAMPLES / 2);
        }

        let bucket = (anomaly_score.clamp(0.0, 1.0) * 10.0).min(9.0) as usize;
        self.score_buckets[bucket] += 1;
    }

    /// Record a tick dropped by a scoring error
    pub fn record_scoring_failure(&mut self) {
        self.scoring_failures += 1;
    }

    /// Record a snapshot the presenter could not render
    pub fn record_presentation_failure(&mut self) {
        self.presentation_failures += 1;
    }

    /// Record a tick that outlasted its interval
    pub fn record_overrun(&mut self) {
        self.overruns += 1;
    }

    /// Share of scored transactions flagged as fraudulent, in percent
    pub fn fraud_rate(&self) -> f64 {
        if self.transactions_scored > 0 {
            self.fraudulent as f64 / self.transactions_scored as f64 * 100.0
        } else {
            0.0
        }
    }

    /// Get scoring time statistics
    pub fn get_scoring_stats(&self) -> ScoringStats {
        if self.scoring_times.is_empty() {
            return ScoringStats::default();
        }

        let mut sorted = self.scoring_times.clone();
        sorted.sort_unstable();

        let count = sorted.len();
        let sum: u64 = sorted.iter().sum();

        ScoringStats {
            count: count as u64,
            mean_us: sum / count as u64,
            p50_us: sorted[count / 2],
            p95_us: sorted[(count as f64 * 0.95) as usize],
            p99_us: sorted[(count as f64 * 0.99) as usize],
            max_us: sorted[count - 1],
        }
    }

    /// Transactions per second since the metrics were created
    pub fn get_throughput(&self) -> f64 {
        let elapsed = self.start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.transactions_scored as f64 / elapsed
        } else {
            0.0
        }
    }

    /// Get anomaly score distribution
    pub fn get_score_distribution(&self) -> [u64; 10] {
        self.score_buckets
    }

    /// Log summary statistics
    pub fn print_summary(&self) {
        let scoring = self.get_scoring_stats();
        let score_dist = self.get_score_distribution();

        info!("╔══════════════════════════════════════════════════════════════╗");
        info!("║            FRAUD STREAM MONITOR - RUN SUMMARY                ║");
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Ticks: {:>8}  │  Scored: {:>8}  │  Throughput: {:>6.2} tx/s",
            self.ticks,
            self.transactions_scored,
            self.get_throughput()
        );
        info!(
            "║ Fraudulent: {:>8}  │  Fraud Rate: {:>6.2}%",
            self.fraudulent,
            self.fraud_rate()
        );
        info!(
            "║ Failures: scoring={} presentation={} overruns={}",
            self.scoring_failures, self.presentation_failures, self.overruns
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!(
            "║ Scoring Time (μs): mean={:>5} p50={:>5} p95={:>5} p99={:>5} max={:>5}",
            scoring.mean_us, scoring.p50_us, scoring.p95_us, scoring.p99_us, scoring.max_us
        );
        info!("╠══════════════════════════════════════════════════════════════╣");
        info!("║ Anomaly Score Distribution:                                  ║");
        let total: u64 = score_dist.iter().sum();
        for (i, &count) in score_dist.iter().enumerate() {
            let pct = if total > 0 { (count as f64 / total as f64) * 100.0 } else { 0.0 };
            let bar: String = "█".repeat(((pct / 2.0) as usize).min(20));
            info!(
                "║   {:.1}-{:.1}: {:>6} ({:>5.1}%) {}",
                i as f64 / 10.0,
                (i + 1) as f64 / 10.0,
                count,
                pct,
                bar
            );
        }
        info!("╚══════════════════════════════════════════════════════════════╝");
    }
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Scoring time statistics
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ScoringStats {
    pub count: u64,
    pub mean_us: u64,
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub max_us: u64,
}
