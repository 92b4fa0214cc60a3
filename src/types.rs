//! Input data model for the pivot engine.
//!
//! Records arrive from the ingestion/storage side as flat rows of loosely typed scalars. They are
//! held row-major in a [`DataSet`] whose [`Schema`] is the ordered list of column names, so the
//! engine resolves a column to a position once per pivot and indexes rows by position afterwards.

use std::borrow::Cow;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{PivotError, PivotResult};

static NULL: Value = Value::Null;

/// A single scalar cell value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing/empty value.
    Null,
    /// 64-bit signed integer.
    Int64(i64),
    /// 64-bit float.
    Float64(f64),
    /// Boolean.
    Bool(bool),
    /// UTF-8 string.
    Utf8(String),
}

impl Value {
    /// Stringified form used for filter matching and category keys.
    ///
    /// `Null` becomes the empty string; integral floats print without a fraction (`10.0` → `"10"`).
    pub fn to_text(&self) -> Cow<'_, str> {
        match self {
            Value::Null => Cow::Borrowed(""),
            Value::Int64(v) => Cow::Owned(v.to_string()),
            Value::Float64(v) => Cow::Owned(format_float(*v)),
            Value::Bool(true) => Cow::Borrowed("true"),
            Value::Bool(false) => Cow::Borrowed("false"),
            Value::Utf8(s) => Cow::Borrowed(s.as_str()),
        }
    }

    /// Exact, case-sensitive comparison of the stringified value against `target`.
    pub fn text_eq(&self, target: &str) -> bool {
        match self {
            Value::Null => target.is_empty(),
            Value::Utf8(s) => s == target,
            other => other.to_text() == target,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&serde_json::Value> for Value {
    /// Arrays and objects are kept as their JSON text so multi-select cells (`["a","b"]`) survive.
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int64(i),
                None => n.as_f64().map(Value::Float64).unwrap_or(Value::Null),
            },
            serde_json::Value::String(s) => Value::Utf8(s.clone()),
            other => Value::Utf8(other.to_string()),
        }
    }
}

fn format_float(v: f64) -> String {
    if v.is_finite() && v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}

/// Ordered column names of a [`DataSet`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    /// Column names in order.
    pub columns: Vec<String>,
}

impl Schema {
    /// Create a new schema from column names.
    pub fn new<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    /// Iterate column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(String::as_str)
    }

    /// Returns the index of a column by name, if present.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// In-memory tabular input (the engine's `RawRow` collection).
///
/// Rows are stored as `Vec<Vec<Value>>` in [`Schema`] column order. Rows may be shorter than the
/// schema; missing trailing cells read as [`Value::Null`]. The engine never mutates a dataset.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataSet {
    /// Schema describing row shape.
    pub schema: Schema,
    /// Row-major value storage.
    pub rows: Vec<Vec<Value>>,
}

impl DataSet {
    /// Create a dataset from schema and rows.
    pub fn new(schema: Schema, rows: Vec<Vec<Value>>) -> Self {
        Self { schema, rows }
    }

    /// Build a dataset from heterogeneous records of `(column, value)` pairs.
    ///
    /// The schema is the union of all columns in first-seen order; cells a record does not
    /// mention are [`Value::Null`].
    pub fn from_records<R, K, V>(records: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let mut columns: Vec<String> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();
        let mut rows: Vec<Vec<Value>> = Vec::new();

        for record in records {
            let mut row: Vec<Value> = vec![Value::Null; columns.len()];
            for (k, v) in record {
                let k = k.into();
                let idx = match positions.get(&k) {
                    Some(&i) => i,
                    None => {
                        let i = columns.len();
                        positions.insert(k.clone(), i);
                        columns.push(k);
                        i
                    }
                };
                if row.len() <= idx {
                    row.resize(idx + 1, Value::Null);
                }
                row[idx] = v.into();
            }
            rows.push(row);
        }

        Self {
            schema: Schema { columns },
            rows,
        }
    }

    /// Decode a JSON array of flat objects into a dataset.
    ///
    /// ```rust
    /// use chart_pivot::types::{DataSet, Value};
    ///
    /// let ds = DataSet::from_json_str(r#"[{"channel":"FB","sales":"10"},{"channel":"TW"}]"#).unwrap();
    /// assert_eq!(ds.row_count(), 2);
    /// assert_eq!(ds.cell(1, ds.schema.index_of("sales")), &Value::Null);
    /// ```
    pub fn from_json_str(input: &str) -> PivotResult<Self> {
        let parsed: serde_json::Value = serde_json::from_str(input)?;
        let items = parsed.as_array().ok_or_else(|| PivotError::InvalidRows {
            message: "rows json must be an array of objects".to_string(),
        })?;

        let mut records = Vec::with_capacity(items.len());
        for (i, item) in items.iter().enumerate() {
            let obj = item.as_object().ok_or_else(|| PivotError::InvalidRows {
                message: format!("row {} is not a json object", i + 1),
            })?;
            records.push(obj.iter().map(|(k, v)| (k.clone(), Value::from(v))));
        }

        Ok(Self::from_records(records))
    }

    /// Number of rows in the dataset.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Cell at `row` / column position `column`; absent columns and short rows read as `Null`.
    pub fn cell(&self, row: usize, column: Option<usize>) -> &Value {
        match self.rows.get(row) {
            Some(r) => cell_at(r, column),
            None => &NULL,
        }
    }

    /// Create a new dataset containing only rows that match `predicate`.
    ///
    /// The returned dataset preserves the original schema.
    pub fn filter_rows<F>(&self, mut predicate: F) -> Self
    where
        F: FnMut(&[Value]) -> bool,
    {
        let rows = self
            .rows
            .iter()
            .filter(|row| predicate(row.as_slice()))
            .cloned()
            .collect();
        Self {
            schema: self.schema.clone(),
            rows,
        }
    }
}

/// Reads a cell from a row slice; `None` columns and out-of-range positions are `Null`.
pub fn cell_at(row: &[Value], column: Option<usize>) -> &Value {
    column.and_then(|i| row.get(i)).unwrap_or(&NULL)
}
