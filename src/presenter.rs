//! Dashboard snapshots and the presenters that render them

use crate::config::{PresentationConfig, PresenterFormat};
use crate::error::{MonitorError, Result};
use crate::history::HistoryStore;
use crate::types::transaction::ScoredTransaction;
use serde::Serialize;
use std::io::{self, Write};
use tracing::debug;

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// One point of the amount/balance trend
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrendPoint {
    pub amount: f64,
    pub balance: f64,
}

/// Read-only views handed to the presenter once per tick
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub tick: u64,
    pub total_transactions: u64,
    /// Most recent entries, oldest first
    pub latest: Vec<&'a ScoredTransaction>,
    /// Amount and balance for every retained entry
    pub trend: Vec<TrendPoint>,
    /// Most recent fraudulent entries, `None` when there are none
    pub recent_frauds: Option<Vec<&'a ScoredTransaction>>,
}

impl<'a> Snapshot<'a> {
    /// Take the rolling windows the dashboard shows after `tick`
    pub fn capture(
        tick: u64,
        history: &'a HistoryStore,
        latest_rows: usize,
        recent_frauds: usize,
    ) -> Self {
        let frauds = history.recent_matching(|entry| entry.is_fraudulent(), recent_frauds);
        Self {
            tick,
            total_transactions: history.total_appended(),
            latest: history.tail(latest_rows).collect(),
            trend: history
                .trend()
                .map(|(amount, balance)| TrendPoint { amount, balance })
                .collect(),
            recent_frauds: if frauds.is_empty() { None } else { Some(frauds) },
        }
    }
}

/// Renders snapshots to some display
pub trait Presenter {
    fn present(&mut self, snapshot: &Snapshot<'_>) -> Result<()>;
}

impl<P: Presenter + ?Sized> Presenter for Box<P> {
    fn present(&mut self, snapshot: &Snapshot<'_>) -> Result<()> {
        (**self).present(snapshot)
    }
}

/// Build the presenter selected by configuration, writing to stdout
pub fn from_config(config: &PresentationConfig) -> Box<dyn Presenter> {
    match config.format {
        PresenterFormat::Table => Box::new(TablePresenter::new(io::stdout(), config.trend_width)),
        PresenterFormat::Json => Box::new(JsonPresenter::new(io::stdout())),
        PresenterFormat::None => Box::new(NullPresenter),
    }
}

fn presentation_failure(err: impl std::fmt::Display) -> MonitorError {
    MonitorError::PresentationFailure(err.to_string())
}

/// Plain text dashboard
pub struct TablePresenter<W: Write> {
    out: W,
    trend_width: usize,
}

impl<W: Write> TablePresenter<W> {
    /// Create a table presenter showing up to `trend_width` sparkline points
    pub fn new(out: W, trend_width: usize) -> Self {
        Self { out, trend_width }
    }

    /// Consume the presenter and return its writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn render(&mut self, snapshot: &Snapshot<'_>) -> io::Result<()> {
        let flagged = snapshot.recent_frauds.as_ref().map_or(0, Vec::len);
        writeln!(
            self.out,
            "═══ Tick {} │ {} transactions │ {} recent fraudulent ═══",
            snapshot.tick, snapshot.total_transactions, flagged
        )?;

        writeln!(self.out, "#### Latest Transactions with Validation Status")?;
        write_table(&mut self.out, &snapshot.latest)?;

        writeln!(self.out, "#### Transaction Trends Over Time")?;
        if snapshot.trend.is_empty() {
            writeln!(self.out, "No transactions yet.")?;
        } else {
            let amounts: Vec<f64> = snapshot.trend.iter().map(|p| p.amount).collect();
            let balances: Vec<f64> = snapshot.trend.iter().map(|p| p.balance).collect();
            write_trend_line(&mut self.out, "amount", &amounts, self.trend_width)?;
            write_trend_line(&mut self.out, "balance", &balances, self.trend_width)?;
        }

        writeln!(self.out, "#### Recent Fraudulent Transactions")?;
        match &snapshot.recent_frauds {
            Some(frauds) => write_table(&mut self.out, frauds)?,
            None => writeln!(self.out, "No fraudulent transactions detected recently.")?,
        }
        writeln!(self.out)?;
        self.out.flush()
    }
}

impl<W: Write> Presenter for TablePresenter<W> {
    fn present(&mut self, snapshot: &Snapshot<'_>) -> Result<()> {
        self.render(snapshot).map_err(presentation_failure)?;
        debug!(tick = snapshot.tick, "Dashboard rendered");
        Ok(())
    }
}

fn write_table<W: Write>(out: &mut W, rows: &[&ScoredTransaction]) -> io::Result<()> {
    writeln!(
        out,
        "{:>8}  {:>10}  {:<6}  {:>10}  {:<10}  {:>6}",
        "seq", "amount", "type", "balance", "status", "score"
    )?;
    for row in rows {
        writeln!(
            out,
            "{:>8}  {:>10.2}  {:<6}  {:>10.2}  {:<10}  {:>6.3}",
            row.sequence,
            row.amount,
            row.transaction_type.as_str(),
            row.balance,
            row.status.as_str(),
            row.anomaly_score
        )?;
    }
    Ok(())
}

fn write_trend_line<W: Write>(out: &mut W, label: &str, values: &[f64], width: usize) -> io::Result<()> {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let start = values.len().saturating_sub(width);
    writeln!(
        out,
        "{:<8} min={:>10.2} mean={:>10.2} max={:>10.2}  {}",
        label,
        min,
        mean,
        max,
        sparkline(&values[start..])
    )
}

/// Unicode block sparkline scaled to the slice's own min and max
pub fn sparkline(values: &[f64]) -> String {
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let span = max - min;
    values
        .iter()
        .map(|&v| {
            if span <= 0.0 {
                SPARK_LEVELS[0]
            } else {
                let level = ((v - min) / span * (SPARK_LEVELS.len() - 1) as f64).round() as usize;
                SPARK_LEVELS[level.min(SPARK_LEVELS.len() - 1)]
            }
        })
        .collect()
}

/// One JSON document per tick, newline delimited
pub struct JsonPresenter<W: Write> {
    out: W,
}

impl<W: Write> JsonPresenter<W> {
    /// Create a JSON presenter writing to `out`
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// Consume the presenter and return its writer
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> Presenter for JsonPresenter<W> {
    fn present(&mut self, snapshot: &Snapshot<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, snapshot).map_err(presentation_failure)?;
        writeln!(self.out).map_err(presentation_failure)?;
        self.out.flush().map_err(presentation_failure)
    }
}

/// Discards every snapshot
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&mut self, _snapshot: &Snapshot<'_>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::transaction::{ProcessedRecord, Transaction, TransactionType};
    use crate::types::verdict::Verdict;

    fn store_with(statuses: &[Verdict]) -> HistoryStore {
        let mut store = HistoryStore::new();
        for (i, &status) in statuses.iter().enumerate() {
            let seq = i as u64 + 1;
            let raw = Transaction::new(100.0 * seq as f64, TransactionType::Debit, 5_000.0);
            let processed = ProcessedRecord {
                amount: raw.amount,
                transaction_type: raw.transaction_type,
                balance: raw.balance,
            };
            store.append(ScoredTransaction::new(seq, &raw, &processed, status, 0.4));
        }
        store
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "display went away"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_snapshot_windows() {
        let mut statuses = vec![Verdict::Legit; 30];
        for i in [2, 9, 14, 20, 25, 28] {
            statuses[i] = Verdict::Fraudulent;
        }
        let store = store_with(&statuses);

        let snapshot = Snapshot::capture(30, &store, 10, 5);

        assert_eq!(snapshot.latest.len(), 10);
        assert_eq!(snapshot.latest[0].sequence, 21);
        assert_eq!(snapshot.latest[9].sequence, 30);
        assert_eq!(snapshot.trend.len(), 30);
        let frauds = snapshot.recent_frauds.unwrap();
        let seqs: Vec<u64> = frauds.iter().map(|e| e.sequence).collect();
        assert_eq!(seqs, vec![10, 15, 21, 26, 29]);
    }

    #[test]
    fn test_empty_store_snapshot_has_no_frauds() {
        let store = HistoryStore::new();
        let snapshot = Snapshot::capture(0, &store, 10, 5);
        assert!(snapshot.latest.is_empty());
        assert!(snapshot.trend.is_empty());
        assert!(snapshot.recent_frauds.is_none());

        let mut presenter = TablePresenter::new(Vec::new(), 60);
        presenter.present(&snapshot).unwrap();
        let text = String::from_utf8(presenter.into_inner()).unwrap();
        assert!(text.contains("No fraudulent transactions detected recently."));
        assert!(text.contains("No transactions yet."));
    }

    #[test]
    fn test_table_presenter_lists_frauds() {
        let store = store_with(&[Verdict::Legit, Verdict::Fraudulent, Verdict::Legit]);
        let snapshot = Snapshot::capture(3, &store, 10, 5);

        let mut presenter = TablePresenter::new(Vec::new(), 60);
        presenter.present(&snapshot).unwrap();
        let text = String::from_utf8(presenter.into_inner()).unwrap();

        assert!(text.contains("#### Latest Transactions with Validation Status"));
        assert!(text.contains("#### Transaction Trends Over Time"));
        assert!(text.contains("Fraudulent"));
        assert!(!text.contains("No fraudulent transactions detected recently."));
    }

    #[test]
    fn test_json_presenter_emits_one_line_per_snapshot() {
        let store = store_with(&[Verdict::Legit, Verdict::Fraudulent]);
        let mut presenter = JsonPresenter::new(Vec::new());
        presenter.present(&Snapshot::capture(1, &store, 10, 5)).unwrap();
        presenter.present(&Snapshot::capture(2, &store, 10, 5)).unwrap();

        let text = String::from_utf8(presenter.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(value["tick"], 2);
        assert_eq!(value["latest"].as_array().unwrap().len(), 2);
        assert_eq!(value["recent_frauds"][0]["status"], "Fraudulent");
    }

    #[test]
    fn test_write_error_is_presentation_failure() {
        let store = store_with(&[Verdict::Legit]);
        let snapshot = Snapshot::capture(1, &store, 10, 5);

        let err = TablePresenter::new(BrokenPipe, 60).present(&snapshot).unwrap_err();
        assert!(matches!(err, MonitorError::PresentationFailure(_)));

        let err = JsonPresenter::new(BrokenPipe).present(&snapshot).unwrap_err();
        assert!(matches!(err, MonitorError::PresentationFailure(_)));
    }

    #[test]
    fn test_sparkline() {
        assert_eq!(sparkline(&[0.0, 7.0]), "▁█");
        assert_eq!(sparkline(&[3.0, 3.0, 3.0]), "▁▁▁");
        assert_eq!(sparkline(&[]), "");
        assert_eq!(sparkline(&[1.0, 2.0, 3.0]).chars().count(), 3);
    }
}
