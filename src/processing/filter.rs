//! Equality row filtering (global, widget-level and per-series clauses).

use crate::spec::FilterClause;
use crate::types::{DataSet, Schema, Value, cell_at};

/// A set of [`FilterClause`]s with columns resolved against a [`Schema`].
///
/// Clauses with an empty target are dropped at compile time since they always match. A clause on
/// a column the schema lacks can only match an empty target, so it rejects every row.
#[derive(Debug, Clone, Default)]
pub struct RowFilter {
    clauses: Vec<(Option<usize>, String)>,
}

impl RowFilter {
    pub fn compile(schema: &Schema, clauses: &[FilterClause]) -> Self {
        let clauses = clauses
            .iter()
            .filter(|c| !c.value.is_empty())
            .map(|c| (schema.index_of(&c.column), c.value.clone()))
            .collect();
        Self { clauses }
    }

    /// True when every clause matches (an empty filter keeps everything).
    pub fn matches(&self, row: &[Value]) -> bool {
        self.clauses
            .iter()
            .all(|(idx, target)| idx.is_some() && cell_at(row, *idx).text_eq(target))
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

/// Returns a new [`DataSet`] containing only rows that satisfy every clause.
pub fn filter(dataset: &DataSet, clauses: &[FilterClause]) -> DataSet {
    let compiled = RowFilter::compile(&dataset.schema, clauses);
    dataset.filter_rows(|row| compiled.matches(row))
}

#[cfg(test)]
mod tests {
    use super::filter;
    use crate::spec::FilterClause;
    use crate::types::{DataSet, Value};

    fn sample_dataset() -> DataSet {
        DataSet::from_records(vec![
            vec![("channel", Value::from("FB")), ("paid", Value::Bool(true)), ("n", Value::Int64(1))],
            vec![("channel", Value::from("TW")), ("paid", Value::Bool(false)), ("n", Value::Int64(2))],
            vec![("channel", Value::from("fb")), ("paid", Value::Bool(true)), ("n", Value::Null)],
        ])
    }

    #[test]
    fn empty_clause_list_keeps_all_rows() {
        let ds = sample_dataset();
        assert_eq!(filter(&ds, &[]).row_count(), 3);
    }

    #[test]
    fn matching_is_exact_and_case_sensitive() {
        let ds = sample_dataset();
        let out = filter(&ds, &[FilterClause::new("channel", "FB")]);
        assert_eq!(out.row_count(), 1);
        assert_eq!(out.rows[0][0], Value::from("FB"));
    }

    #[test]
    fn all_clauses_must_match_on_stringified_values() {
        let ds = sample_dataset();
        let out = filter(
            &ds,
            &[FilterClause::new("paid", "true"), FilterClause::new("n", "1")],
        );
        assert_eq!(out.row_count(), 1);
    }

    #[test]
    fn empty_target_is_no_constraint() {
        let ds = sample_dataset();
        let out = filter(&ds, &[FilterClause::new("channel", ""), FilterClause::new("missing", "")]);
        assert_eq!(out.row_count(), 3);
    }

    #[test]
    fn absent_column_never_matches_non_empty_target() {
        let ds = sample_dataset();
        assert_eq!(filter(&ds, &[FilterClause::new("missing", "x")]).row_count(), 0);
    }

    #[test]
    fn null_cell_does_not_match_non_empty_target() {
        let ds = sample_dataset();
        assert_eq!(filter(&ds, &[FilterClause::new("n", "2")]).row_count(), 1);
    }
}
