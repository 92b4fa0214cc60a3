//! The pivot pipeline: `(rows, spec) -> ChartDataset` as one pure call.
//!
//! filter (global, widget) → aggregate (series filters, overrides, explosion; averages finalized)
//! → stack normalize → category filter → sort → limit.

use std::collections::HashSet;

use crate::dataset::{ChartDataset, DataRow};
use crate::spec::{ChartType, WidgetSpec};
use crate::types::{DataSet, Value};

use super::aggregate::{aggregate, aggregate_total, build_columns};
use super::filter::RowFilter;
use super::limit::limit;
use super::sort::sort;
use super::stack::normalize;

/// Pipeline configuration that is not part of a widget.
#[derive(Debug, Clone, PartialEq)]
pub struct PivotOptions {
    /// Dashboard-level filters, applied before the widget's own filters.
    pub global_filters: Vec<crate::spec::FilterClause>,
    /// Category/stack key for null or empty cells.
    pub missing_label: String,
    /// Name of the folded remainder row.
    pub others_label: String,
    /// Name of the single KPI row.
    pub kpi_label: String,
}

impl Default for PivotOptions {
    fn default() -> Self {
        Self {
            global_filters: Vec::new(),
            missing_label: "N/A".to_string(),
            others_label: "Others".to_string(),
            kpi_label: "Total".to_string(),
        }
    }
}

/// Row/category counts observed while pivoting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PivotStats {
    pub input_rows: usize,
    pub filtered_rows: usize,
    pub categories: usize,
    pub rows_before_limit: usize,
    pub rows_after_limit: usize,
    pub folded: bool,
}

/// Pivot `dataset` according to `spec` with [`PivotOptions::default`].
///
/// ```rust
/// use chart_pivot::pivot;
/// use chart_pivot::spec::{MeasureKind, SortConfig, SortMode, WidgetSpec};
/// use chart_pivot::types::DataSet;
///
/// let rows = DataSet::from_json_str(
///     r#"[{"channel":"FB","sales":"10"},{"channel":"FB","sales":"20"},{"channel":"TW","sales":"5"}]"#,
/// ).unwrap();
/// let mut spec = WidgetSpec::legacy("channel", MeasureKind::Sum, Some("sales"));
/// spec.sort_config = SortConfig::new(SortMode::ValueDesc);
///
/// let out = pivot(&rows, &spec);
/// assert_eq!(out.to_json_string().unwrap(), r#"[{"name":"FB","value":30.0},{"name":"TW","value":5.0}]"#);
/// ```
pub fn pivot(dataset: &DataSet, spec: &WidgetSpec) -> ChartDataset {
    pivot_with_options(dataset, spec, &PivotOptions::default())
}

/// Pivot `dataset` according to `spec` and `options`.
///
/// Never fails: a widget without any dimension yields an empty dataset, unparseable numbers
/// count as 0 and filters on absent columns simply match nothing.
pub fn pivot_with_options(dataset: &DataSet, spec: &WidgetSpec, options: &PivotOptions) -> ChartDataset {
    run(dataset, spec, options).0
}

pub(crate) fn run(dataset: &DataSet, spec: &WidgetSpec, options: &PivotOptions) -> (ChartDataset, PivotStats) {
    let mut stats = PivotStats {
        input_rows: dataset.row_count(),
        ..Default::default()
    };

    let global = RowFilter::compile(&dataset.schema, &options.global_filters);
    let widget = RowFilter::compile(&dataset.schema, &spec.filters);
    let rows: Vec<&[Value]> = dataset
        .rows
        .iter()
        .map(Vec::as_slice)
        .filter(|row| global.matches(row) && widget.matches(row))
        .collect();
    stats.filtered_rows = rows.len();

    if spec.chart_type == ChartType::Kpi {
        let columns = build_columns(spec, &[], false);
        let totals = aggregate_total(&dataset.schema, &rows, spec);
        let values = columns.iter().map(|c| c.key.clone()).zip(totals).collect();
        let out = ChartDataset {
            rows: vec![DataRow::new(options.kpi_label.clone(), values)],
            columns,
            resolved_order: vec![options.kpi_label.clone()],
        };
        stats.categories = 1;
        stats.rows_before_limit = 1;
        stats.rows_after_limit = 1;
        return (out, stats);
    }

    if spec.has_no_dimension() {
        return (ChartDataset::default(), stats);
    }

    let aggregation = aggregate(&dataset.schema, &rows, spec, &options.missing_label);
    stats.categories = aggregation.categories.len();

    let mut out_rows = normalize(&aggregation, spec.stack_mode);
    if !spec.category_filter.is_empty() {
        let keep: HashSet<&str> = spec.category_filter.iter().map(String::as_str).collect();
        out_rows.retain(|r| keep.contains(r.name.as_str()));
    }

    let out_rows = sort(out_rows, &spec.sort_config);
    let resolved_order: Vec<String> = out_rows.iter().map(|r| r.name.clone()).collect();
    stats.rows_before_limit = out_rows.len();

    let fold = spec.fold_remainder
        && spec.series.is_legacy()
        && !aggregation.stacked
        && spec.chart_type != ChartType::WordCloud;
    stats.folded = fold && spec.row_limit > 0 && out_rows.len() > spec.row_limit;
    let out_rows = limit(out_rows, spec.row_limit, fold, &options.others_label);
    stats.rows_after_limit = out_rows.len();

    let out = ChartDataset {
        rows: out_rows,
        columns: aggregation.columns,
        resolved_order,
    };
    (out, stats)
}
