//! Stack normalization: grouped, absolute-stacked and 100%-stacked rows.

use crate::dataset::DataRow;
use crate::spec::StackMode;

use super::aggregate::Aggregation;

/// Turns a finalized [`Aggregation`] into output rows in category encounter order.
///
/// Unstacked aggregations (no `stack_by_column`) pass through without a `total`, whatever the
/// mode. Column order is the aggregation's column order, which lists stack keys sorted.
pub fn normalize(aggregation: &Aggregation, mode: StackMode) -> Vec<DataRow> {
    aggregation
        .categories
        .iter()
        .zip(&aggregation.values)
        .map(|(name, values)| {
            let values = aggregation
                .columns
                .iter()
                .zip(values)
                .map(|(col, v)| (col.key.clone(), *v))
                .collect();
            let mut row = DataRow::new(name.clone(), values);
            if aggregation.stacked {
                normalize_row(&mut row, mode);
            }
            row
        })
        .collect()
}

/// Applies `mode` to one row of stack-key columns.
///
/// - `Grouped`: untouched, no `total`.
/// - `Stacked`: `total` is the column sum.
/// - `Percent`: columns rescaled to sum to 100 when the total is nonzero; a zero total is left as-is.
pub fn normalize_row(row: &mut DataRow, mode: StackMode) {
    match mode {
        StackMode::Grouped => {}
        StackMode::Stacked => row.total = Some(row.value_sum()),
        StackMode::Percent => {
            let total = row.value_sum();
            if total != 0.0 {
                for (_, v) in row.values.iter_mut() {
                    *v = *v / total * 100.0;
                }
                row.total = Some(100.0);
            } else {
                row.total = Some(total);
            }
        }
    }
}
