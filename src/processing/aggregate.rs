//! Grouping of filtered rows by category and per-series measure computation.
//!
//! One pass over the rows feeds every series: each series applies its own filters on top of the
//! widget-level ones, buckets by its effective dimension, and accumulates into a column of a
//! shared category table. Categories are kept in the order they were first seen, which is the
//! axis order when no sort is configured.

use std::collections::{HashMap, HashSet};

use crate::dataset::SeriesColumn;
use crate::spec::{MeasureKind, SeriesSpec, VALUE_KEY, WidgetSpec};
use crate::types::{Schema, Value, cell_at};

use super::coerce::{explode_multi_valued, is_multi_valued, key_or_missing, parse_lenient_number};
use super::filter::RowFilter;

/// Running state of one (category, column) cell.
///
/// Averages keep sum and count and divide once in [`Accumulator::finish`]; no streaming mean.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    pub sum: f64,
    pub count: u64,
}

impl Accumulator {
    pub fn add(&mut self, amount: f64) {
        self.sum += amount;
        self.count += 1;
    }

    pub fn finish(&self, kind: MeasureKind) -> f64 {
        match kind {
            MeasureKind::Count => self.count as f64,
            MeasureKind::Sum => self.sum,
            MeasureKind::Average if self.count == 0 => 0.0,
            MeasureKind::Average => self.sum / self.count as f64,
        }
    }
}

/// Finalized category table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregation {
    /// Category keys in first-seen order.
    pub categories: Vec<String>,
    /// Value columns; for stacked widgets one per (series, stack key).
    pub columns: Vec<SeriesColumn>,
    /// `values[category][column]`, averages already finalized.
    pub values: Vec<Vec<f64>>,
    /// Whether columns are stack keys (a `stack_by_column` is set).
    pub stacked: bool,
}

impl Aggregation {
    /// Numeric value of `column_key` for `category`, if both exist.
    pub fn value(&self, category: &str, column_key: &str) -> Option<f64> {
        let c = self.categories.iter().position(|k| k == category)?;
        let col = self.columns.iter().position(|k| k.key == column_key)?;
        Some(self.values[c][col])
    }
}

struct CompiledSeries<'a> {
    spec: &'a SeriesSpec,
    filter: RowFilter,
    /// `false` when the series has no dimension to bucket by.
    active: bool,
    dimension: Option<usize>,
    measure: Option<usize>,
}

impl<'a> CompiledSeries<'a> {
    fn compile(schema: &Schema, widget: &'a WidgetSpec, spec: &'a SeriesSpec) -> Self {
        let dimension = widget.dimension_for(spec);
        let measure = match spec.measure_kind {
            MeasureKind::Count => None,
            MeasureKind::Sum | MeasureKind::Average => spec
                .measure_column
                .as_deref()
                .and_then(|c| schema.index_of(c)),
        };
        Self {
            spec,
            filter: RowFilter::compile(schema, &spec.filters),
            active: !dimension.is_empty(),
            dimension: schema.index_of(dimension),
            measure,
        }
    }

    fn amount(&self, row: &[Value]) -> f64 {
        match self.measure {
            Some(_) => parse_lenient_number(cell_at(row, self.measure)),
            None => 0.0,
        }
    }
}

/// Category → accumulator row table that grows as new categories are met.
struct CategoryTable {
    positions: HashMap<String, usize>,
    names: Vec<String>,
    cells: Vec<Vec<Accumulator>>,
    width: usize,
}

impl CategoryTable {
    fn new(width: usize) -> Self {
        Self {
            positions: HashMap::new(),
            names: Vec::new(),
            cells: Vec::new(),
            width,
        }
    }

    fn cell(&mut self, key: &str, column: usize) -> &mut Accumulator {
        let idx = match self.positions.get(key) {
            Some(&i) => i,
            None => {
                let i = self.names.len();
                self.positions.insert(key.to_string(), i);
                self.names.push(key.to_string());
                self.cells.push(vec![Accumulator::default(); self.width]);
                i
            }
        };
        &mut self.cells[idx][column]
    }
}

/// Groups `rows` (already widget-filtered) by category and computes every series' measure.
pub fn aggregate(schema: &Schema, rows: &[&[Value]], widget: &WidgetSpec, missing_label: &str) -> Aggregation {
    let series = widget.series.series();
    let explode = widget.series.is_legacy() && widget.explode_multi_valued;

    let stack_column = widget
        .stack_by_column
        .as_deref()
        .filter(|c| !c.is_empty())
        .map(|c| schema.index_of(c));
    let stack_keys = match stack_column {
        Some(idx) => collect_stack_keys(rows, idx, missing_label),
        None => Vec::new(),
    };
    let stacked = stack_column.is_some();
    let stack_positions: HashMap<&str, usize> = stack_keys
        .iter()
        .enumerate()
        .map(|(i, k)| (k.as_str(), i))
        .collect();
    let width = if stacked { stack_keys.len() } else { 1 };

    let compiled: Vec<CompiledSeries<'_>> = series
        .iter()
        .map(|s| CompiledSeries::compile(schema, widget, s))
        .collect();

    let mut table = CategoryTable::new(width * compiled.len());

    for row in rows {
        let slot = match stack_column {
            Some(idx) => {
                let text = cell_at(row, idx).to_text();
                stack_positions.get(key_or_missing(&text, missing_label)).copied().unwrap_or(0)
            }
            None => 0,
        };

        for (s_idx, s) in compiled.iter().enumerate() {
            if !s.active || !s.filter.matches(row) {
                continue;
            }
            let amount = s.amount(row);
            let column = s_idx * width + slot;
            let text = cell_at(row, s.dimension).to_text();

            if explode && is_multi_valued(&text) {
                for member in explode_multi_valued(&text) {
                    table.cell(&member, column).add(amount);
                }
            } else {
                table.cell(key_or_missing(&text, missing_label), column).add(amount);
            }
        }
    }

    let kinds: Vec<MeasureKind> = compiled
        .iter()
        .flat_map(|s| std::iter::repeat_n(s.spec.measure_kind, width))
        .collect();
    let values = table
        .cells
        .iter()
        .map(|row| row.iter().zip(&kinds).map(|(acc, kind)| acc.finish(*kind)).collect())
        .collect();

    Aggregation {
        categories: table.names,
        columns: build_columns(widget, &stack_keys, stacked),
        values,
        stacked,
    }
}

/// Aggregates the whole filtered set into one value per series (KPI widgets).
pub fn aggregate_total(schema: &Schema, rows: &[&[Value]], widget: &WidgetSpec) -> Vec<f64> {
    widget
        .series
        .series()
        .iter()
        .map(|spec| {
            let s = CompiledSeries::compile(schema, widget, spec);
            let mut acc = Accumulator::default();
            for row in rows.iter().filter(|row| s.filter.matches(row)) {
                acc.add(s.amount(row));
            }
            acc.finish(spec.measure_kind)
        })
        .collect()
}

/// Distinct stack keys across `rows`, sorted so column layout ignores row arrival order.
fn collect_stack_keys(rows: &[&[Value]], column: Option<usize>, missing_label: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for row in rows {
        let text = cell_at(row, column).to_text();
        let key = key_or_missing(&text, missing_label);
        if !seen.contains(key) {
            seen.insert(key.to_string());
            keys.push(key.to_string());
        }
    }
    keys.sort();
    keys
}

/// Output column descriptors for a widget, matching the column layout of [`aggregate`].
pub fn build_columns(widget: &WidgetSpec, stack_keys: &[String], stacked: bool) -> Vec<SeriesColumn> {
    let legacy = widget.series.is_legacy();
    let mut columns = Vec::new();
    for s in widget.series.series() {
        if stacked {
            for k in stack_keys {
                let (key, label) = if legacy {
                    (k.clone(), k.clone())
                } else {
                    (format!("{}:{}", s.id, k), format!("{}: {}", s.display_label(), k))
                };
                columns.push(SeriesColumn {
                    key,
                    label,
                    side: s.stack_side,
                    color: None,
                });
            }
        } else {
            columns.push(SeriesColumn {
                key: if legacy { VALUE_KEY.to_string() } else { s.id.clone() },
                label: s.display_label().to_string(),
                side: s.stack_side,
                color: s.color.clone(),
            });
        }
    }
    columns
}
