//! The pivot pipeline stages.
//!
//! Each stage is a plain function over in-memory values, usable on its own:
//!
//! - [`filter()`]: equality filter clauses ([`RowFilter`])
//! - [`aggregate()`]: grouping + count/sum/average per series
//! - [`normalize()`]: grouped / stacked / percent stacking
//! - [`sort()`]: category ordering
//! - [`limit()`]: truncation with optional Others folding
//! - [`pivot()`]: all of the above in order
//!
//! ## Example: stacked percent chart
//!
//! ```rust
//! use chart_pivot::processing::pivot;
//! use chart_pivot::spec::{MeasureKind, StackMode, WidgetSpec};
//! use chart_pivot::types::DataSet;
//!
//! let rows = DataSet::from_json_str(r#"[
//!     {"channel":"FB","sentiment":"Positive"},
//!     {"channel":"FB","sentiment":"Negative"},
//!     {"channel":"TW","sentiment":"Positive"}
//! ]"#).unwrap();
//!
//! let mut spec = WidgetSpec::legacy("channel", MeasureKind::Count, None);
//! spec.stack_by_column = Some("sentiment".to_string());
//! spec.stack_mode = StackMode::Percent;
//!
//! let out = pivot(&rows, &spec);
//! assert_eq!(out.rows[0].get("Positive"), Some(50.0));
//! assert_eq!(out.rows[1].get("Positive"), Some(100.0));
//! assert_eq!(out.rows[1].get("total"), Some(100.0));
//! ```

pub mod aggregate;
pub mod coerce;
pub mod filter;
pub mod limit;
pub mod pivot;
pub mod sort;
pub mod stack;

pub use aggregate::{Accumulator, Aggregation, aggregate, aggregate_total};
pub use coerce::{category_key, explode_multi_valued, key_or_missing, parse_lenient_number, parse_lenient_str};
pub use filter::{RowFilter, filter};
pub use limit::limit;
pub use pivot::{PivotOptions, PivotStats, pivot, pivot_with_options};
pub use sort::{compare_names, sort};
pub use stack::{normalize, normalize_row};
