//! The generate → preprocess → score → store → present loop

use crate::config::AppConfig;
use crate::error::Result;
use crate::generator::TransactionSource;
use crate::history::HistoryStore;
use crate::metrics::PipelineMetrics;
use crate::models::inference::InferenceEngine;
use crate::preprocessor::Preprocessor;
use crate::presenter::{Presenter, Snapshot};
use crate::types::transaction::ScoredTransaction;
use crate::types::verdict::Verdict;
use std::time::{Duration, Instant};
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

/// Lifecycle of the driver loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    Running,
    Stopped,
}

/// Loop pacing and presentation windows
#[derive(Debug, Clone)]
pub struct DriverSettings {
    pub tick_interval: Duration,
    pub latest_rows: usize,
    pub recent_frauds: usize,
    pub max_ticks: Option<u64>,
    pub summary_every_ticks: u64,
}

impl DriverSettings {
    /// Pacing and windows from the simulation, presentation and pipeline sections
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            tick_interval: config.simulation.tick_interval(),
            latest_rows: config.presentation.latest_rows,
            recent_frauds: config.presentation.recent_frauds,
            max_ticks: config.simulation.max_ticks,
            summary_every_ticks: config.pipeline.summary_every_ticks,
        }
    }
}

impl Default for DriverSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// What a successful tick produced
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TickReport {
    pub sequence: u64,
    pub verdict: Verdict,
    pub anomaly_score: f64,
    /// False when the presenter failed; the entry is stored regardless
    pub presented: bool,
}

/// Totals at the end of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub ticks: u64,
    pub transactions: u64,
    pub fraudulent: u64,
    pub scoring_failures: u64,
    pub presentation_failures: u64,
    /// Entries still held by the history store
    pub retained: usize,
}

/// Owns every stage of the pipeline and runs it one tick at a time
pub struct Driver<S: TransactionSource, P: Presenter> {
    source: S,
    preprocessor: Preprocessor,
    engine: InferenceEngine,
    history: HistoryStore,
    presenter: P,
    metrics: PipelineMetrics,
    settings: DriverSettings,
    state: DriverState,
}

impl<S: TransactionSource, P: Presenter> Driver<S, P> {
    /// Assemble a driver from already built stages
    pub fn new(
        source: S,
        preprocessor: Preprocessor,
        engine: InferenceEngine,
        history: HistoryStore,
        presenter: P,
        settings: DriverSettings,
    ) -> Self {
        Self {
            source,
            preprocessor,
            engine,
            history,
            presenter,
            metrics: PipelineMetrics::new(),
            settings,
            state: DriverState::Stopped,
        }
    }

    /// Build every stage from configuration, training the reference model
    pub fn from_config(config: &AppConfig, source: S, presenter: P) -> Result<Self> {
        let engine = InferenceEngine::new(config)?;
        Ok(Self::new(
            source,
            Preprocessor::from_config(&config.simulation),
            engine,
            HistoryStore::with_capacity(config.history.capacity),
            presenter,
            DriverSettings::from_config(config),
        ))
    }

    /// Current lifecycle state
    pub fn state(&self) -> DriverState {
        self.state
    }

    /// Every entry stored so far
    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Run statistics
    pub fn metrics(&self) -> &PipelineMetrics {
        &self.metrics
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    /// Ticks attempted so far
    pub fn ticks(&self) -> u64 {
        self.metrics.ticks
    }

    /// Run one tick without waiting.
    ///
    /// Generation and scoring errors are returned and nothing is appended.
    /// A presenter failure is logged and reported through
    /// [`TickReport::presented`].
    pub fn tick(&mut self) -> Result<TickReport> {
        self.metrics.record_tick();

        let transaction = self.source.next_transaction()?;
        let processed = self.preprocessor.preprocess(&transaction);

        let started = Instant::now();
        let prediction = match self.engine.score(&processed) {
            Ok(prediction) => prediction,
            Err(e) => {
                self.metrics.record_scoring_failure();
                return Err(e);
            }
        };
        self.metrics
            .record_scored(started.elapsed(), prediction.anomaly_score, prediction.verdict);

        let sequence = self.history.total_appended() + 1;
        let entry = ScoredTransaction::new(
            sequence,
            &transaction,
            &processed,
            prediction.verdict,
            prediction.anomaly_score,
        );

        if entry.is_fraudulent() {
            info!(
                sequence = sequence,
                amount = entry.amount,
                balance = entry.balance,
                transaction_type = %entry.transaction_type,
                anomaly_score = entry.anomaly_score,
                "Fraudulent transaction flagged"
            );
        } else {
            debug!(
                sequence = sequence,
                anomaly_score = entry.anomaly_score,
                "Transaction legit"
            );
        }

        self.history.append(entry);
        let presented = self.present();

        Ok(TickReport {
            sequence,
            verdict: prediction.verdict,
            anomaly_score: prediction.anomaly_score,
            presented,
        })
    }

    /// Hand the current snapshot to the presenter; failures are logged, not raised
    pub fn present(&mut self) -> bool {
        let snapshot = Snapshot::capture(
            self.ticks(),
            &self.history,
            self.settings.latest_rows,
            self.settings.recent_frauds,
        );
        match self.presenter.present(&snapshot) {
            Ok(()) => true,
            Err(e) => {
                warn!(tick = self.ticks(), error = %e, "Presentation failed, continuing");
                self.metrics.record_presentation_failure();
                false
            }
        }
    }

    fn reached_max_ticks(&self) -> bool {
        self.settings.max_ticks.is_some_and(|max| self.ticks() >= max)
    }

    /// Tick until shutdown is signalled, `max_ticks` is reached or a fatal
    /// error occurs.
    ///
    /// The watch channel is the only way to end a run early. Shutdown is
    /// observed between ticks; dropping the sender counts as a shutdown
    /// signal. The state reads `Running` only while this future is alive.
    pub async fn run(&mut self, mut shutdown: watch::Receiver<bool>) -> Result<RunSummary> {
        self.state = DriverState::Running;
        info!(
            tick_interval_ms = self.settings.tick_interval.as_millis() as u64,
            max_ticks = ?self.settings.max_ticks,
            model = %self.engine.model_name(),
            "Driver loop started"
        );

        while !*shutdown.borrow() && !self.reached_max_ticks() {
            let started = Instant::now();

            match self.tick() {
                Ok(report) => self.log_progress(&report),
                Err(e) if e.is_fatal() => {
                    error!(tick = self.ticks(), error = %e, "Fatal error, stopping driver");
                    self.state = DriverState::Stopped;
                    return Err(e);
                }
                Err(e) => {
                    error!(tick = self.ticks(), error = %e, "Tick failed, nothing stored");
                }
            }

            let elapsed = started.elapsed();
            let interval = self.settings.tick_interval;
            if !interval.is_zero() && elapsed > interval {
                self.metrics.record_overrun();
                warn!(
                    tick = self.ticks(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    interval_ms = interval.as_millis() as u64,
                    "Tick overran its interval"
                );
            }

            if self.reached_max_ticks() {
                break;
            }

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        info!("Shutdown sender dropped");
                        break;
                    }
                }
            }
        }

        self.state = DriverState::Stopped;
        let summary = self.summary();
        info!(
            ticks = summary.ticks,
            transactions = summary.transactions,
            fraudulent = summary.fraudulent,
            "Driver loop stopped"
        );
        Ok(summary)
    }

    fn log_progress(&self, report: &TickReport) {
        let every = self.settings.summary_every_ticks;
        if every > 0 && self.ticks() % every == 0 {
            info!(
                tick = self.ticks(),
                last_sequence = report.sequence,
                fraudulent = self.metrics.fraudulent,
                fraud_rate = %format!("{:.2}%", self.metrics.fraud_rate()),
                retained = self.history.len(),
                "Processing milestone"
            );
        }
    }

    /// Totals for the run so far
    pub fn summary(&self) -> RunSummary {
        RunSummary {
            ticks: self.ticks(),
            transactions: self.history.total_appended(),
            fraudulent: self.metrics.fraudulent,
            scoring_failures: self.metrics.scoring_failures,
            presentation_failures: self.metrics.presentation_failures,
            retained: self.history.len(),
        }
    }
}
