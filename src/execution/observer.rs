use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Events emitted by the [`super::PivotEngine`] for each widget it pivots.
#[derive(Debug, Clone, PartialEq)]
pub enum PivotEvent {
    RunStarted { widget: usize },
    RowsFiltered { widget: usize, input_rows: usize, output_rows: usize },
    CategoriesAggregated { widget: usize, categories: usize },
    Limited { widget: usize, before: usize, after: usize, folded: bool },
    RunFinished {
        widget: usize,
        elapsed: Duration,
        metrics: PivotMetricsSnapshot,
    },
}

/// Observer hook for pivot events.
pub trait PivotObserver: Send + Sync {
    fn on_event(&self, event: &PivotEvent);
}

/// A simple stderr logger for pivot events.
#[derive(Debug, Default)]
pub struct StdErrPivotObserver;

impl PivotObserver for StdErrPivotObserver {
    fn on_event(&self, event: &PivotEvent) {
        match event {
            PivotEvent::RunFinished { widget, elapsed, metrics } => {
                eprintln!("[pivot][done] widget={widget} elapsed={elapsed:?} {metrics}")
            }
            other => eprintln!("[pivot] {other:?}"),
        }
    }
}

/// Fans events out to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PivotObserver>>,
}

impl CompositeObserver {
    pub fn new(observers: Vec<Arc<dyn PivotObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PivotObserver for CompositeObserver {
    fn on_event(&self, event: &PivotEvent) {
        for o in &self.observers {
            o.on_event(event);
        }
    }
}

/// Cumulative counters across every pivot an engine has run.
///
/// Updated concurrently by batch runs; callers can snapshot them at any time.
pub struct PivotMetrics {
    started_at: Mutex<Option<Instant>>,
    pivots_started: AtomicU64,
    pivots_finished: AtomicU64,
    rows_scanned: AtomicU64,
    rows_matched: AtomicU64,
    categories_emitted: AtomicU64,
    busy_ns: AtomicU64,
}

impl PivotMetrics {
    pub fn new() -> Self {
        Self {
            started_at: Mutex::new(None),
            pivots_started: AtomicU64::new(0),
            pivots_finished: AtomicU64::new(0),
            rows_scanned: AtomicU64::new(0),
            rows_matched: AtomicU64::new(0),
            categories_emitted: AtomicU64::new(0),
            busy_ns: AtomicU64::new(0),
        }
    }

    pub fn on_pivot_start(&self) {
        let _ = self.pivots_started.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut started) = self.started_at.lock() {
            started.get_or_insert_with(Instant::now);
        }
    }

    pub fn on_pivot_end(&self, scanned: usize, matched: usize, emitted: usize, elapsed: Duration) {
        let _ = self.rows_scanned.fetch_add(scanned as u64, Ordering::SeqCst);
        let _ = self.rows_matched.fetch_add(matched as u64, Ordering::SeqCst);
        let _ = self.categories_emitted.fetch_add(emitted as u64, Ordering::SeqCst);
        let _ = self
            .busy_ns
            .fetch_add(elapsed.as_nanos().min(u64::MAX as u128) as u64, Ordering::SeqCst);
        let _ = self.pivots_finished.fetch_add(1, Ordering::SeqCst);
    }

    pub fn reset(&self) {
        if let Ok(mut started) = self.started_at.lock() {
            *started = None;
        }
        self.pivots_started.store(0, Ordering::SeqCst);
        self.pivots_finished.store(0, Ordering::SeqCst);
        self.rows_scanned.store(0, Ordering::SeqCst);
        self.rows_matched.store(0, Ordering::SeqCst);
        self.categories_emitted.store(0, Ordering::SeqCst);
        self.busy_ns.store(0, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> PivotMetricsSnapshot {
        let since_first_start = self
            .started_at
            .lock()
            .ok()
            .and_then(|started| started.as_ref().map(Instant::elapsed));

        PivotMetricsSnapshot {
            pivots_started: self.pivots_started.load(Ordering::SeqCst),
            pivots_finished: self.pivots_finished.load(Ordering::SeqCst),
            rows_scanned: self.rows_scanned.load(Ordering::SeqCst),
            rows_matched: self.rows_matched.load(Ordering::SeqCst),
            categories_emitted: self.categories_emitted.load(Ordering::SeqCst),
            busy: Duration::from_nanos(self.busy_ns.load(Ordering::SeqCst)),
            since_first_start,
        }
    }
}

impl Default for PivotMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Immutable snapshot of [`PivotMetrics`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PivotMetricsSnapshot {
    pub pivots_started: u64,
    pub pivots_finished: u64,
    pub rows_scanned: u64,
    pub rows_matched: u64,
    pub categories_emitted: u64,
    /// Summed per-pivot wall time (exceeds real time when pivots overlap).
    pub busy: Duration,
    pub since_first_start: Option<Duration>,
}

impl fmt::Display for PivotMetricsSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "pivots={}/{}, rows_scanned={}, rows_matched={}, categories={}, busy={:?}",
            self.pivots_finished,
            self.pivots_started,
            self.rows_scanned,
            self.rows_matched,
            self.categories_emitted,
            self.busy
        )
    }
}
