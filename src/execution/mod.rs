//! Instrumented runner for the pivot pipeline.
//!
//! This module sits "above" [`crate::processing`] and provides:
//!
//! - Parallel pivoting of independent widgets (one dashboard refresh) on a rayon pool
//! - Real-time metrics + observer hooks for monitoring
//!
//! The pipeline itself is pure and shares nothing between calls, so a batch produces exactly
//! the datasets that sequential [`crate::pivot_with_options`] calls would.

mod observer;

use std::sync::Arc;
use std::time::Instant;

use rayon::ThreadPool;
use rayon::ThreadPoolBuilder;
use rayon::prelude::*;

use crate::dataset::ChartDataset;
use crate::error::PivotResult;
use crate::processing::PivotOptions;
use crate::processing::pivot::run;
use crate::spec::WidgetSpec;
use crate::types::DataSet;

pub use observer::{
    CompositeObserver, PivotEvent, PivotMetrics, PivotMetricsSnapshot, PivotObserver, StdErrPivotObserver,
};

/// Configuration for the [`PivotEngine`].
#[derive(Debug, Clone)]
pub struct ExecutionOptions {
    /// Number of worker threads used for batch pivots.
    ///
    /// If `None`, uses the platform's available parallelism.
    pub num_threads: Option<usize>,
    /// Pipeline options applied to every widget.
    pub pivot: PivotOptions,
}

impl Default for ExecutionOptions {
    fn default() -> Self {
        let n = std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1);
        Self {
            num_threads: Some(n),
            pivot: PivotOptions::default(),
        }
    }
}

/// One widget of a batch: the rows it reads and its spec.
#[derive(Debug, Clone, Copy)]
pub struct WidgetJob<'a> {
    pub dataset: &'a DataSet,
    pub spec: &'a WidgetSpec,
}

impl<'a> WidgetJob<'a> {
    pub fn new(dataset: &'a DataSet, spec: &'a WidgetSpec) -> Self {
        Self { dataset, spec }
    }
}

/// Runs pivots with observer events and metrics, off the caller's thread for batches.
pub struct PivotEngine {
    pool: ThreadPool,
    opts: ExecutionOptions,
    observer: Option<Arc<dyn PivotObserver>>,
    metrics: Arc<PivotMetrics>,
}

impl PivotEngine {
    /// Create a new engine with the given options. `num_threads == Some(0)` is treated as 1.
    pub fn new(opts: ExecutionOptions) -> PivotResult<Self> {
        let n_threads = opts
            .num_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
            .max(1);

        let pool = ThreadPoolBuilder::new().num_threads(n_threads).build()?;

        Ok(Self {
            pool,
            opts,
            observer: None,
            metrics: Arc::new(PivotMetrics::new()),
        })
    }

    /// Attach an observer for pivot events (metrics/logging).
    pub fn with_observer(mut self, observer: Arc<dyn PivotObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Get a handle to real-time metrics.
    pub fn metrics(&self) -> Arc<PivotMetrics> {
        Arc::clone(&self.metrics)
    }

    pub fn options(&self) -> &ExecutionOptions {
        &self.opts
    }

    /// Pivot one widget on the calling thread.
    pub fn pivot(&self, dataset: &DataSet, spec: &WidgetSpec) -> ChartDataset {
        self.run_widget(0, dataset, spec)
    }

    /// Pivot independent widgets in parallel; results are returned in `jobs` order.
    pub fn pivot_many(&self, jobs: &[WidgetJob<'_>]) -> Vec<ChartDataset> {
        self.pool.install(|| {
            jobs.par_iter()
                .enumerate()
                .map(|(i, job)| self.run_widget(i, job.dataset, job.spec))
                .collect()
        })
    }

    fn run_widget(&self, widget: usize, dataset: &DataSet, spec: &WidgetSpec) -> ChartDataset {
        let start = Instant::now();
        self.metrics.on_pivot_start();
        self.emit(PivotEvent::RunStarted { widget });

        let (out, stats) = run(dataset, spec, &self.opts.pivot);

        self.emit(PivotEvent::RowsFiltered {
            widget,
            input_rows: stats.input_rows,
            output_rows: stats.filtered_rows,
        });
        self.emit(PivotEvent::CategoriesAggregated {
            widget,
            categories: stats.categories,
        });
        self.emit(PivotEvent::Limited {
            widget,
            before: stats.rows_before_limit,
            after: stats.rows_after_limit,
            folded: stats.folded,
        });

        let elapsed = start.elapsed();
        self.metrics
            .on_pivot_end(stats.input_rows, stats.filtered_rows, out.len(), elapsed);
        self.emit(PivotEvent::RunFinished {
            widget,
            elapsed,
            metrics: self.metrics.snapshot(),
        });
        out
    }

    fn emit(&self, event: PivotEvent) {
        if let Some(obs) = &self.observer {
            obs.on_event(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ExecutionOptions, PivotEngine, WidgetJob};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use crate::execution::{PivotEvent, PivotObserver};
    use crate::spec::{MeasureKind, WidgetSpec};
    use crate::types::{DataSet, Value};

    fn dataset_of_n(n: usize) -> DataSet {
        DataSet::from_records((0..n).map(|i| {
            vec![
                ("bucket", Value::from(format!("b{}", i % 7))),
                ("amount", Value::Int64(i as i64)),
            ]
        }))
    }

    #[derive(Default)]
    struct RecordingObserver {
        events: Mutex<Vec<PivotEvent>>,
        finished: AtomicUsize,
    }

    impl PivotObserver for RecordingObserver {
        fn on_event(&self, event: &PivotEvent) {
            if matches!(event, PivotEvent::RunFinished { .. }) {
                let _ = self.finished.fetch_add(1, Ordering::SeqCst);
            }
            self.events.lock().unwrap().push(event.clone());
        }
    }

    #[test]
    fn single_pivot_emits_events_in_order() {
        let ds = dataset_of_n(20);
        let observer = Arc::new(RecordingObserver::default());
        let engine = PivotEngine::new(ExecutionOptions {
            num_threads: Some(1),
            ..Default::default()
        })
        .unwrap()
        .with_observer(observer.clone());

        let out = engine.pivot(&ds, &WidgetSpec::legacy("bucket", MeasureKind::Count, None));
        assert_eq!(out.len(), 7);

        let events = observer.events.lock().unwrap().clone();
        assert_eq!(events.len(), 5);
        assert_eq!(events[0], PivotEvent::RunStarted { widget: 0 });
        assert_eq!(
            events[1],
            PivotEvent::RowsFiltered {
                widget: 0,
                input_rows: 20,
                output_rows: 20
            }
        );
        assert_eq!(events[2], PivotEvent::CategoriesAggregated { widget: 0, categories: 7 });
        assert!(matches!(events[4], PivotEvent::RunFinished { widget: 0, .. }));
    }

    #[test]
    fn batch_matches_sequential_results_in_order() {
        let ds = dataset_of_n(500);
        let specs = vec![
            WidgetSpec::legacy("bucket", MeasureKind::Count, None),
            WidgetSpec::legacy("bucket", MeasureKind::Sum, Some("amount")),
            WidgetSpec::legacy("bucket", MeasureKind::Average, Some("amount")),
            WidgetSpec::legacy("", MeasureKind::Count, None),
        ];
        let engine = PivotEngine::new(ExecutionOptions {
            num_threads: Some(4),
            ..Default::default()
        })
        .unwrap();

        let jobs: Vec<WidgetJob<'_>> = specs.iter().map(|s| WidgetJob::new(&ds, s)).collect();
        let batch = engine.pivot_many(&jobs);
        let sequential: Vec<_> = specs.iter().map(|s| crate::pivot(&ds, s)).collect();
        assert_eq!(batch, sequential);
    }

    #[test]
    fn metrics_accumulate_across_runs() {
        let ds = dataset_of_n(30);
        let observer = Arc::new(RecordingObserver::default());
        let engine = PivotEngine::new(ExecutionOptions {
            num_threads: Some(2),
            ..Default::default()
        })
        .unwrap()
        .with_observer(observer.clone());
        let metrics = engine.metrics();

        let spec = WidgetSpec::legacy("bucket", MeasureKind::Count, None);
        let jobs = vec![WidgetJob::new(&ds, &spec); 3];
        let _ = engine.pivot_many(&jobs);

        let snap = metrics.snapshot();
        assert_eq!(snap.pivots_started, 3);
        assert_eq!(snap.pivots_finished, 3);
        assert_eq!(snap.rows_scanned, 90);
        assert_eq!(snap.categories_emitted, 21);
        assert!(snap.since_first_start.is_some());
        assert_eq!(observer.finished.load(Ordering::SeqCst), 3);

        metrics.reset();
        assert_eq!(metrics.snapshot().pivots_started, 0);
    }
}
