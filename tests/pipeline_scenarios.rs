//! End-to-end scenarios for the monitoring pipeline.

use fraud_stream_monitor::config::AppConfig;
use fraud_stream_monitor::driver::{Driver, DriverSettings};
use fraud_stream_monitor::error::{MonitorError, Result};
use fraud_stream_monitor::generator::{RandomTransactionGenerator, TransactionSource};
use fraud_stream_monitor::history::HistoryStore;
use fraud_stream_monitor::models::{InferenceEngine, IsolationForest};
use fraud_stream_monitor::preprocessor::Preprocessor;
use fraud_stream_monitor::presenter::{NullPresenter, Presenter, Snapshot, TablePresenter};
use fraud_stream_monitor::types::{Transaction, TransactionType, Verdict};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::VecDeque;
use tokio::sync::watch;

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.model.seed = Some(42);
    config.simulation.tick_interval_ms = 0;
    config
}

/// Replays a fixed list of transactions, then reports the stream as exhausted
struct ScriptedSource {
    queue: VecDeque<Transaction>,
}

impl ScriptedSource {
    fn new(transactions: Vec<Transaction>) -> Self {
        Self {
            queue: transactions.into(),
        }
    }
}

impl TransactionSource for ScriptedSource {
    fn next_transaction(&mut self) -> Result<Transaction> {
        self.queue
            .pop_front()
            .ok_or_else(|| MonitorError::GenerationFailure("script exhausted".to_string()))
    }
}

/// Records every snapshot it is given
#[derive(Default)]
struct RecordingPresenter {
    latest_lens: Vec<usize>,
    trend_lens: Vec<usize>,
    fraud_views: Vec<Option<Vec<u64>>>,
}

impl Presenter for RecordingPresenter {
    fn present(&mut self, snapshot: &Snapshot<'_>) -> Result<()> {
        self.latest_lens.push(snapshot.latest.len());
        self.trend_lens.push(snapshot.trend.len());
        self.fraud_views.push(
            snapshot
                .recent_frauds
                .as_ref()
                .map(|frauds| frauds.iter().map(|e| e.sequence).collect()),
        );
        Ok(())
    }
}

fn scripted_transactions(count: usize, seed: u64) -> Vec<Transaction> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count)
        .map(|i| {
            let transaction_type = if i % 2 == 0 {
                TransactionType::Credit
            } else {
                TransactionType::Debit
            };
            Transaction::new(
                rng.gen_range(1.0..=10_000.0),
                transaction_type,
                rng.gen_range(100.0..=50_000.0),
            )
        })
        .collect()
}

#[test]
fn twenty_scripted_ticks_keep_emission_order() {
    let script = scripted_transactions(20, 2024);
    let mut driver =
        Driver::from_config(&test_config(), ScriptedSource::new(script.clone()), NullPresenter).unwrap();

    for _ in 0..20 {
        driver.tick().unwrap();
    }

    let history = driver.history();
    assert_eq!(history.len(), 20);
    for (i, (stored, emitted)) in history.iter().zip(&script).enumerate() {
        assert_eq!(stored.sequence, i as u64 + 1);
        assert_eq!(stored.amount, emitted.amount);
        assert_eq!(stored.balance, emitted.balance);
        assert_eq!(stored.transaction_type, emitted.transaction_type);
    }

    let tail: Vec<u64> = history.tail(5).map(|e| e.sequence).collect();
    assert_eq!(tail, vec![16, 17, 18, 19, 20]);
}

#[tokio::test]
async fn exhausted_script_ends_run_with_generation_failure() {
    let script = scripted_transactions(7, 1);
    let mut driver =
        Driver::from_config(&test_config(), ScriptedSource::new(script), NullPresenter).unwrap();
    let (_tx, rx) = watch::channel(false);

    let err = driver.run(rx).await.unwrap_err();
    assert!(matches!(err, MonitorError::GenerationFailure(_)));
    assert_eq!(driver.history().len(), 7);
}

#[test]
fn clamp_invariant_holds_for_out_of_range_source() {
    let script = vec![
        Transaction::new(-500.0, TransactionType::Debit, 90_000.0),
        Transaction::new(1e12, TransactionType::Credit, 0.5),
        Transaction::new(0.0, TransactionType::Debit, -1.0),
        Transaction::new(f64::NAN, TransactionType::Credit, f64::NAN),
    ];
    let mut driver =
        Driver::from_config(&test_config(), ScriptedSource::new(script), NullPresenter).unwrap();

    for _ in 0..4 {
        driver.tick().unwrap();
    }

    for entry in driver.history().iter() {
        assert!((1.0..=10_000.0).contains(&entry.amount), "amount {}", entry.amount);
        assert!((100.0..=50_000.0).contains(&entry.balance), "balance {}", entry.balance);
    }
}

#[test]
fn fraud_filter_is_an_ordered_subsequence() {
    let mut config = test_config();
    config.simulation.seed = Some(77);
    let source = RandomTransactionGenerator::from_config(&config.simulation);
    let mut driver = Driver::from_config(&config, source, NullPresenter).unwrap();

    for _ in 0..300 {
        driver.tick().unwrap();
    }

    let history = driver.history();
    let frauds: Vec<u64> = history.filter(|e| e.status == Verdict::Fraudulent).map(|e| e.sequence).collect();
    assert!(frauds.windows(2).all(|w| w[0] < w[1]));
    assert!(history
        .filter(|e| e.status == Verdict::Fraudulent)
        .all(|e| e.status != Verdict::Legit));

    let legit = history.filter(|e| e.status == Verdict::Legit).count();
    assert_eq!(legit + frauds.len(), 300);
}

#[test]
fn boundary_record_verdict_ignores_transaction_type() {
    let script = vec![
        Transaction::new(5.0, TransactionType::Credit, 100.0),
        Transaction::new(5.0, TransactionType::Debit, 100.0),
    ];
    let mut driver =
        Driver::from_config(&test_config(), ScriptedSource::new(script), NullPresenter).unwrap();

    let credit = driver.tick().unwrap();
    let debit = driver.tick().unwrap();

    assert!(matches!(credit.verdict, Verdict::Legit | Verdict::Fraudulent));
    assert_eq!(credit.verdict, debit.verdict);
    assert_eq!(credit.anomaly_score, debit.anomaly_score);
}

#[test]
fn empty_history_renders_none_detected() {
    let store = HistoryStore::new();
    assert_eq!(store.filter(|e| e.is_fraudulent()).count(), 0);

    let snapshot = Snapshot::capture(0, &store, 10, 5);
    assert!(snapshot.recent_frauds.is_none());

    let mut presenter = TablePresenter::new(Vec::new(), 60);
    presenter.present(&snapshot).unwrap();
    let text = String::from_utf8(presenter.into_inner()).unwrap();
    assert!(text.contains("No fraudulent transactions detected recently."));
}

#[test]
fn presenter_sees_rolling_windows() {
    let script = scripted_transactions(14, 9);
    let mut driver = Driver::from_config(
        &test_config(),
        ScriptedSource::new(script),
        RecordingPresenter::default(),
    )
    .unwrap();

    for _ in 0..14 {
        driver.tick().unwrap();
    }

    let presenter = driver.presenter();
    assert_eq!(presenter.latest_lens.len(), 14);
    assert_eq!(presenter.latest_lens[0], 1);
    assert_eq!(presenter.latest_lens[9], 10);
    assert_eq!(presenter.latest_lens[13], 10);
    assert_eq!(presenter.trend_lens, (1..=14).collect::<Vec<_>>());

    // The fraud view always agrees with the stored verdicts
    let frauds: Vec<u64> = driver
        .history()
        .filter(|e| e.is_fraudulent())
        .map(|e| e.sequence)
        .collect();
    let last_view = presenter.fraud_views.last().unwrap();
    if frauds.is_empty() {
        assert!(last_view.is_none());
    } else {
        let expected: Vec<u64> = frauds.iter().rev().take(5).rev().copied().collect();
        assert_eq!(last_view.as_ref().unwrap(), &expected);
    }
}

#[tokio::test]
async fn bounded_history_keeps_counting() {
    let mut config = test_config();
    config.history.capacity = Some(25);
    config.simulation.max_ticks = Some(60);
    config.simulation.seed = Some(3);
    let source = RandomTransactionGenerator::from_config(&config.simulation);
    let mut driver = Driver::from_config(&config, source, NullPresenter).unwrap();
    let (_tx, rx) = watch::channel(false);

    let summary = driver.run(rx).await.unwrap();

    assert_eq!(summary.transactions, 60);
    assert_eq!(summary.retained, 25);
    let sequences: Vec<u64> = driver.history().iter().map(|e| e.sequence).collect();
    assert_eq!(sequences, (36..=60).collect::<Vec<_>>());
}

#[test]
fn overflowing_amount_range_is_rejected_not_panicking() {
    let mut config = test_config();
    config.simulation.amount_min = -1e308;
    config.simulation.amount_max = 1e308;
    assert!(config.validate().is_err());

    let source = RandomTransactionGenerator::from_config(&config.simulation);
    let err = Driver::from_config(&config, source, NullPresenter).err();
    assert!(matches!(err, Some(MonitorError::InvalidConfig { .. })));

    let mut source = RandomTransactionGenerator::from_config(&config.simulation);
    assert!(matches!(
        source.next_transaction(),
        Err(MonitorError::GenerationFailure(_))
    ));
}

#[test]
fn unfitted_model_never_appends() {
    let mut driver = Driver::new(
        ScriptedSource::new(scripted_transactions(3, 5)),
        Preprocessor::default(),
        InferenceEngine::with_model(IsolationForest::default()),
        HistoryStore::new(),
        NullPresenter,
        DriverSettings::default(),
    );

    for _ in 0..3 {
        assert!(matches!(driver.tick(), Err(MonitorError::ModelNotReady)));
    }
    assert!(driver.history().is_empty());
}
