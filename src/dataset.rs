//! Chart-ready output of the pivot engine.
//!
//! A [`ChartDataset`] is an ordered list of [`DataRow`]s; row order is the category axis order.
//! Each row serializes as a flat object with the reserved `name` key, one numeric entry per value
//! column, and `total` when stacking is active.

use serde::ser::{Serialize, SerializeMap, Serializer};

use crate::error::PivotResult;
use crate::spec::{NAME_KEY, StackSide, TOTAL_KEY};

/// One category of the output.
#[derive(Debug, Clone, PartialEq)]
pub struct DataRow {
    /// Category label.
    pub name: String,
    /// Value columns in [`ChartDataset::columns`] order.
    pub values: Vec<(String, f64)>,
    /// Sum of all value columns; present only for stacked output.
    pub total: Option<f64>,
}

impl DataRow {
    pub fn new(name: impl Into<String>, values: Vec<(String, f64)>) -> Self {
        Self {
            name: name.into(),
            values,
            total: None,
        }
    }

    /// Value of a column, or `None` if the row has no such key.
    pub fn get(&self, key: &str) -> Option<f64> {
        if key == TOTAL_KEY {
            return self.total;
        }
        self.values.iter().find(|(k, _)| k == key).map(|(_, v)| *v)
    }

    /// Sum across all value columns, ignoring `total`.
    pub fn value_sum(&self) -> f64 {
        self.values.iter().map(|(_, v)| v).sum()
    }
}

impl Serialize for DataRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = 1 + self.values.len() + usize::from(self.total.is_some());
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry(NAME_KEY, &self.name)?;
        for (k, v) in &self.values {
            map.serialize_entry(k, v)?;
        }
        if let Some(total) = self.total {
            map.serialize_entry(TOTAL_KEY, &total)?;
        }
        map.end()
    }
}

/// Describes one value column so renderers can draw it without re-reading the widget.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesColumn {
    /// Key under which each [`DataRow`] stores this column.
    pub key: String,
    pub label: String,
    pub side: StackSide,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

/// Ordered, chart-ready dataset.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartDataset {
    pub rows: Vec<DataRow>,
    pub columns: Vec<SeriesColumn>,
    /// Full category order after sorting and before limiting. Callers may store it as
    /// `SortConfig::persisted_order` to keep the axis stable across edits.
    pub resolved_order: Vec<String>,
}

impl ChartDataset {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Category labels in axis order.
    pub fn names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.name.as_str()).collect()
    }

    pub fn row(&self, name: &str) -> Option<&DataRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    /// Column keys in emitted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.key.as_str())
    }

    /// Serialize the rows as the flat JSON array the renderer consumes.
    pub fn to_json_string(&self) -> PivotResult<String> {
        Ok(serde_json::to_string(&self.rows)?)
    }
}

#[cfg(test)]
mod tests {
    use super::{ChartDataset, DataRow};

    #[test]
    fn rows_serialize_flat_with_reserved_keys() {
        let mut row = DataRow::new("FB", vec![("Positive".to_string(), 75.0), ("Negative".to_string(), 25.0)]);
        row.total = Some(100.0);
        let json = serde_json::to_string(&row).unwrap();
        assert_eq!(json, r#"{"name":"FB","Positive":75.0,"Negative":25.0,"total":100.0}"#);
    }

    #[test]
    fn total_key_is_omitted_when_unstacked() {
        let ds = ChartDataset {
            rows: vec![DataRow::new("TW", vec![("value".to_string(), 5.0)])],
            ..Default::default()
        };
        assert_eq!(ds.to_json_string().unwrap(), r#"[{"name":"TW","value":5.0}]"#);
        assert_eq!(ds.rows[0].get("total"), None);
        assert_eq!(ds.rows[0].get("value"), Some(5.0));
        assert_eq!(ds.names(), vec!["TW"]);
    }
}
