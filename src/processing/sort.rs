//! Category ordering.
//!
//! Every strategy uses a stable sort, so rows with equal keys keep their encounter order and a
//! pivot is reproducible run to run.

use std::cmp::Ordering;
use std::collections::HashMap;

use crate::dataset::DataRow;
use crate::spec::{SortConfig, SortKey, SortMode};

/// Orders `rows`, which must arrive in category encounter order.
///
/// - `Persisted` / `Custom`: rows listed in `persisted_order` / `custom_order` come first in list
///   order; the rest follow in encounter order. An empty list keeps encounter order.
/// - `None`: encounter order.
/// - `ValueDesc` / `ValueAsc`: by row value sum (or name when `sort_key` is `Name`).
/// - `NameAsc` / `NameDesc`: by name.
pub fn sort(mut rows: Vec<DataRow>, config: &SortConfig) -> Vec<DataRow> {
    match config.mode {
        SortMode::Persisted => order_by_list(&mut rows, &config.persisted_order),
        SortMode::None => {}
        SortMode::Custom => order_by_list(&mut rows, &config.custom_order),
        SortMode::ValueDesc => match config.sort_key {
            SortKey::Total => rows.sort_by(|a, b| compare_values(b.value_sum(), a.value_sum())),
            SortKey::Name => rows.sort_by(|a, b| compare_names(&b.name, &a.name)),
        },
        SortMode::ValueAsc => match config.sort_key {
            SortKey::Total => rows.sort_by(|a, b| compare_values(a.value_sum(), b.value_sum())),
            SortKey::Name => rows.sort_by(|a, b| compare_names(&a.name, &b.name)),
        },
        SortMode::NameAsc => rows.sort_by(|a, b| compare_names(&a.name, &b.name)),
        SortMode::NameDesc => rows.sort_by(|a, b| compare_names(&b.name, &a.name)),
    }
    rows
}

fn order_by_list(rows: &mut [DataRow], order: &[String]) {
    if order.is_empty() {
        return;
    }
    let mut positions: HashMap<&str, usize> = HashMap::with_capacity(order.len());
    for (i, name) in order.iter().enumerate() {
        positions.entry(name.as_str()).or_insert(i);
    }
    rows.sort_by_key(|row| match positions.get(row.name.as_str()) {
        Some(&i) => (0, i),
        None => (1, 0),
    });
}

fn compare_values(a: f64, b: f64) -> Ordering {
    a.partial_cmp(&b).unwrap_or(Ordering::Equal)
}

/// Case-insensitive name comparison; among names equal ignoring case, lowercase sorts first.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    let fold = |s: &str| s.chars().flat_map(char::to_lowercase).collect::<Vec<char>>();
    fold(a).cmp(&fold(b)).then_with(|| b.cmp(a))
}

#[cfg(test)]
mod tests {
    use super::{compare_names, sort};
    use crate::dataset::DataRow;
    use crate::spec::{SortConfig, SortKey, SortMode};
    use std::cmp::Ordering;

    fn rows(items: &[(&str, f64)]) -> Vec<DataRow> {
        items
            .iter()
            .map(|(n, v)| DataRow::new(*n, vec![("value".to_string(), *v)]))
            .collect()
    }

    fn names(rows: &[DataRow]) -> Vec<&str> {
        rows.iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn none_keeps_encounter_order() {
        let out = sort(rows(&[("b", 1.0), ("a", 3.0), ("c", 2.0)]), &SortConfig::default());
        assert_eq!(names(&out), vec!["b", "a", "c"]);
    }

    #[test]
    fn value_desc_is_stable_on_ties() {
        let out = sort(
            rows(&[("a", 1.0), ("b", 5.0), ("c", 1.0), ("d", 5.0)]),
            &SortConfig::new(SortMode::ValueDesc),
        );
        assert_eq!(names(&out), vec!["b", "d", "a", "c"]);
    }

    #[test]
    fn value_asc_sums_all_columns() {
        let input = vec![
            DataRow::new("x", vec![("a".to_string(), 1.0), ("b".to_string(), 9.0)]),
            DataRow::new("y", vec![("a".to_string(), 5.0), ("b".to_string(), 1.0)]),
        ];
        let out = sort(input, &SortConfig::new(SortMode::ValueAsc));
        assert_eq!(names(&out), vec!["y", "x"]);
    }

    #[test]
    fn value_sort_by_name_key() {
        let config = SortConfig {
            mode: SortMode::ValueDesc,
            sort_key: SortKey::Name,
            ..Default::default()
        };
        let out = sort(rows(&[("apple", 9.0), ("Cherry", 1.0), ("banana", 5.0)]), &config);
        assert_eq!(names(&out), vec!["Cherry", "banana", "apple"]);
    }

    #[test]
    fn name_sort_ignores_case() {
        let out = sort(
            rows(&[("beta", 0.0), ("Alpha", 0.0), ("alpha", 0.0), ("Gamma", 0.0)]),
            &SortConfig::new(SortMode::NameAsc),
        );
        assert_eq!(names(&out), vec!["alpha", "Alpha", "beta", "Gamma"]);
        assert_eq!(compare_names("Zed", "apple"), Ordering::Greater);
    }

    #[test]
    fn custom_order_appends_unlisted_in_encounter_order() {
        let out = sort(
            rows(&[("A", 1.0), ("B", 2.0), ("C", 3.0), ("D", 4.0)]),
            &SortConfig::custom("C,\nA, missing"),
        );
        assert_eq!(names(&out), vec!["C", "A", "B", "D"]);
    }

    #[test]
    fn persisted_order_uses_persisted_list_only() {
        let config = SortConfig {
            mode: SortMode::Persisted,
            custom_order: vec!["A".to_string()],
            persisted_order: vec!["B".to_string(), "A".to_string()],
            ..Default::default()
        };
        let out = sort(rows(&[("A", 1.0), ("B", 2.0), ("C", 3.0)]), &config);
        assert_eq!(names(&out), vec!["B", "A", "C"]);
    }

    #[test]
    fn persisted_order_matches_names_with_surrounding_spaces() {
        let first = sort(rows(&[("B", 1.0), (" A", 2.0)]), &SortConfig::new(SortMode::ValueDesc));
        let resolved: Vec<String> = first.iter().map(|r| r.name.clone()).collect();
        assert_eq!(resolved, vec![" A", "B"]);

        let config = SortConfig {
            mode: SortMode::Persisted,
            persisted_order: resolved,
            ..Default::default()
        };
        let again = sort(rows(&[("B", 1.0), (" A", 2.0)]), &config);
        assert_eq!(names(&again), vec![" A", "B"]);
    }

    #[test]
    fn empty_persisted_order_keeps_encounter_order() {
        let out = sort(rows(&[("b", 1.0), ("a", 2.0)]), &SortConfig::new(SortMode::Persisted));
        assert_eq!(names(&out), vec!["b", "a"]);
    }
}
