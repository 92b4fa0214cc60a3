//! Row-count truncation with optional remainder folding.

use crate::dataset::DataRow;
use crate::spec::VALUE_KEY;

/// Keeps the first `n` rows of an already-sorted sequence (`n == 0` keeps everything).
///
/// With `fold_remainder`, when rows exceed `n` the first `n - 1` rows are kept and one
/// `others_label` row carrying the sum of every remaining `value` is appended, so the output has
/// exactly `n` rows and the same value total. A category already named `others_label` is folded
/// into that row wherever it ranks, so the label never appears twice. Folding only makes sense
/// for single-`value` rows; callers decide when to request it.
pub fn limit(mut rows: Vec<DataRow>, n: usize, fold_remainder: bool, others_label: &str) -> Vec<DataRow> {
    if n == 0 || rows.len() <= n {
        return rows;
    }
    if !fold_remainder {
        rows.truncate(n);
        return rows;
    }

    let mut folded = 0.0;
    if let Some(i) = rows.iter().position(|r| r.name == others_label) {
        folded += rows.remove(i).get(VALUE_KEY).unwrap_or(0.0);
    }
    let rest = rows.split_off(n - 1);
    folded += rest.iter().map(|r| r.get(VALUE_KEY).unwrap_or(0.0)).sum::<f64>();
    rows.push(DataRow::new(others_label, vec![(VALUE_KEY.to_string(), folded)]));
    rows
}
