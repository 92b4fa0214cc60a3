//! `chart-pivot` turns a collection of flat tabular records into an ordered, chart-ready dataset,
//! driven by a declarative [`spec::WidgetSpec`].
//!
//! The primary entrypoint is [`pivot`] (or [`pivot_with_options`]): a pure, synchronous function
//! of `(rows, spec)` that filters, groups, aggregates, stacks, sorts and limits. The same call
//! serves a live editor preview and the final dashboard render, so both always agree.
//!
//! ## What a widget can ask for
//!
//! - **Series**: one implicit measure ([`spec::SeriesMode::Legacy`], written to `value`) or many
//!   explicit ones ([`spec::SeriesMode::Multi`], written to each series id), each with its own
//!   filters and optional dimension override
//! - **Measures**: count, sum and average, over leniently parsed numbers (`"1,234"` → 1234,
//!   unparseable → 0)
//! - **Stacking**: grouped, stacked (with a `total` key) and 100% stacked by a `stack_by_column`
//! - **Sorting**: encounter order, by value, by name, user custom order, or a persisted order
//! - **Limiting**: row limit with optional folding of the tail into an `Others` row
//!
//! ## Quick example
//!
//! ```rust
//! use chart_pivot::pivot;
//! use chart_pivot::spec::{MeasureKind, SortConfig, SortMode, WidgetSpec};
//! use chart_pivot::types::DataSet;
//!
//! let rows = DataSet::from_json_str(r#"[
//!     {"channel":"FB","sales":"10"},
//!     {"channel":"FB","sales":"20"},
//!     {"channel":"TW","sales":"5"}
//! ]"#).unwrap();
//!
//! let mut spec = WidgetSpec::legacy("channel", MeasureKind::Sum, Some("sales"));
//! spec.sort_config = SortConfig::new(SortMode::ValueDesc);
//!
//! let out = pivot(&rows, &spec);
//! assert_eq!(out.names(), vec!["FB", "TW"]);
//! assert_eq!(out.rows[0].get("value"), Some(30.0));
//! ```
//!
//! ## Modules
//!
//! - [`types`]: input rows ([`types::DataSet`]) and cell values
//! - [`spec`]: the widget specification and its validation
//! - [`dataset`]: the ordered output ([`dataset::ChartDataset`])
//! - [`processing`]: the pipeline stages (filter/aggregate/stack/sort/limit/pivot)
//! - [`execution`]: instrumented, parallel pivoting of many widgets
//! - [`error`]: error types for the fallible edges (JSON, validation, thread pool)

pub mod dataset;
pub mod error;
pub mod execution;
pub mod processing;
pub mod spec;
pub mod types;

pub use error::{PivotError, PivotResult};
pub use processing::{PivotOptions, pivot, pivot_with_options};
