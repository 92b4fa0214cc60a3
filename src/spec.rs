//! Declarative widget specification: what a chart should show.
//!
//! A [`WidgetSpec`] is authored by the builder UI and handed to [`crate::pivot`] together with the
//! rows. The engine assumes but does not enforce structural validity; callers that want the
//! checks run [`WidgetSpec::validate`] before pivoting.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::{PivotError, PivotResult};

/// Reserved output key for the category label.
pub const NAME_KEY: &str = "name";
/// Reserved output key for the stacked row total.
pub const TOTAL_KEY: &str = "total";
/// Output key used by the single implicit series of a legacy widget.
pub const VALUE_KEY: &str = "value";

/// Equality filter on one column. An empty `value` places no constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterClause {
    pub column: String,
    pub value: String,
}

impl FilterClause {
    pub fn new(column: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }
}

/// How a series turns the rows of a category into one number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MeasureKind {
    /// Number of rows.
    #[default]
    Count,
    /// Sum of the leniently parsed measure column.
    Sum,
    /// Sum divided by row count; 0 for an empty group.
    Average,
}

/// Which value axis a series is drawn against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StackSide {
    #[default]
    Left,
    Right,
}

/// One independently aggregated measure plotted against the shared category axis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesSpec {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub measure_kind: MeasureKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure_column: Option<String>,
    /// Buckets this series by a different column than the widget dimension.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension_override: Option<String>,
    #[serde(default)]
    pub stack_side: StackSide,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterClause>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl SeriesSpec {
    /// Create a series; the label defaults to the id.
    pub fn new(id: impl Into<String>, measure_kind: MeasureKind, measure_column: Option<&str>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            measure_kind,
            measure_column: measure_column.map(str::to_string),
            dimension_override: None,
            stack_side: StackSide::Left,
            filters: Vec::new(),
            color: None,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_filter(mut self, clause: FilterClause) -> Self {
        self.filters.push(clause);
        self
    }

    pub fn with_dimension_override(mut self, column: impl Into<String>) -> Self {
        self.dimension_override = Some(column.into());
        self
    }

    pub fn with_side(mut self, side: StackSide) -> Self {
        self.stack_side = side;
        self
    }

    /// Display label, falling back to the id when none was authored.
    pub fn display_label(&self) -> &str {
        if self.label.is_empty() { &self.id } else { &self.label }
    }
}

/// Legacy single-measure widgets vs. explicit multi-series widgets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SeriesMode {
    /// One implicit series writing into the `value` key.
    Legacy(SeriesSpec),
    /// N explicit series, each writing into its own `id` key.
    Multi(Vec<SeriesSpec>),
}

impl SeriesMode {
    pub fn series(&self) -> &[SeriesSpec] {
        match self {
            SeriesMode::Legacy(s) => std::slice::from_ref(s),
            SeriesMode::Multi(list) => list,
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, SeriesMode::Legacy(_))
    }
}

impl Default for SeriesMode {
    fn default() -> Self {
        SeriesMode::Legacy(SeriesSpec::new(VALUE_KEY, MeasureKind::Count, None))
    }
}

/// How stack-key columns are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum StackMode {
    #[default]
    Grouped,
    Stacked,
    Percent,
}

/// Chart family; only affects KPI aggregation and Others-folding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ChartType {
    #[default]
    Bar,
    HorizontalBar,
    Line,
    Area,
    Pie,
    Donut,
    WordCloud,
    Table,
    Kpi,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortMode {
    /// Category encounter order.
    #[default]
    None,
    ValueDesc,
    ValueAsc,
    NameAsc,
    NameDesc,
    Custom,
    Persisted,
}

/// What `ValueDesc` / `ValueAsc` compare on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortKey {
    #[default]
    Total,
    Name,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SortConfig {
    #[serde(default)]
    pub mode: SortMode,
    #[serde(default)]
    pub sort_key: SortKey,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_order: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub persisted_order: Vec<String>,
}

impl SortConfig {
    pub fn new(mode: SortMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    /// Custom ordering from a user-typed, comma- or newline-delimited list.
    pub fn custom(text: &str) -> Self {
        Self {
            mode: SortMode::Custom,
            custom_order: Self::parse_custom_order(text),
            ..Default::default()
        }
    }

    /// Splits on commas and newlines, trims entries and drops blanks.
    ///
    /// ```rust
    /// use chart_pivot::spec::SortConfig;
    ///
    /// assert_eq!(SortConfig::parse_custom_order("C, A\n\nB ,"), vec!["C", "A", "B"]);
    /// ```
    pub fn parse_custom_order(text: &str) -> Vec<String> {
        text.split([',', '\n', '\r'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Declarative description of one chart widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSpec {
    #[serde(default)]
    pub chart_type: ChartType,
    /// Column whose distinct values become categories. Ignored for KPI widgets.
    #[serde(default)]
    pub dimension: String,
    #[serde(default)]
    pub series: SeriesMode,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_by_column: Option<String>,
    #[serde(default)]
    pub stack_mode: StackMode,
    #[serde(default)]
    pub sort_config: SortConfig,
    /// Widget-level filters, applied before series filters.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<FilterClause>,
    /// When non-empty, only these categories are emitted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub category_filter: Vec<String>,
    /// Maximum emitted rows; 0 is unlimited.
    #[serde(default)]
    pub row_limit: usize,
    /// Fold rows past the limit into an Others bucket (single-value, non word-cloud charts).
    #[serde(default)]
    pub fold_remainder: bool,
    /// Treat `[..]` / comma-separated dimension cells as multi-membership (legacy widgets only).
    #[serde(default)]
    pub explode_multi_valued: bool,
}

impl WidgetSpec {
    /// Legacy single-measure widget.
    pub fn legacy(dimension: impl Into<String>, measure_kind: MeasureKind, measure_column: Option<&str>) -> Self {
        Self::with_series(
            dimension,
            SeriesMode::Legacy(SeriesSpec::new(VALUE_KEY, measure_kind, measure_column)),
        )
    }

    /// Explicit multi-series widget.
    pub fn multi(dimension: impl Into<String>, series: Vec<SeriesSpec>) -> Self {
        Self::with_series(dimension, SeriesMode::Multi(series))
    }

    fn with_series(dimension: impl Into<String>, series: SeriesMode) -> Self {
        Self {
            chart_type: ChartType::Bar,
            dimension: dimension.into(),
            series,
            stack_by_column: None,
            stack_mode: StackMode::Grouped,
            sort_config: SortConfig::default(),
            filters: Vec::new(),
            category_filter: Vec::new(),
            row_limit: 0,
            fold_remainder: false,
            explode_multi_valued: false,
        }
    }

    /// Decode a widget spec from JSON.
    pub fn from_json_str(input: &str) -> PivotResult<Self> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json_string(&self) -> PivotResult<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Effective dimension column for a series.
    pub fn dimension_for<'a>(&'a self, series: &'a SeriesSpec) -> &'a str {
        match series.dimension_override.as_deref() {
            Some(d) if !d.is_empty() => d,
            _ => &self.dimension,
        }
    }

    /// True when no series has anything to bucket by.
    pub fn has_no_dimension(&self) -> bool {
        self.series
            .series()
            .iter()
            .all(|s| self.dimension_for(s).is_empty())
    }

    /// Structural checks the authoring UI runs before pivoting. The engine itself never calls
    /// this and tolerates every violation it reports.
    pub fn validate(&self) -> PivotResult<()> {
        if self.chart_type != ChartType::Kpi && self.has_no_dimension() {
            return Err(PivotError::invalid_spec("a dimension is required"));
        }

        let series = self.series.series();
        if series.is_empty() {
            return Err(PivotError::invalid_spec("at least one series is required"));
        }

        let mut seen = HashSet::new();
        for s in series {
            if !self.series.is_legacy() {
                if s.id.is_empty() {
                    return Err(PivotError::invalid_spec("series id must not be empty"));
                }
                if s.id == NAME_KEY || s.id == TOTAL_KEY {
                    return Err(PivotError::invalid_spec(format!(
                        "series id '{}' is reserved",
                        s.id
                    )));
                }
                if !seen.insert(s.id.as_str()) {
                    return Err(PivotError::invalid_spec(format!(
                        "duplicate series id '{}'",
                        s.id
                    )));
                }
            }
            let needs_column = matches!(s.measure_kind, MeasureKind::Sum | MeasureKind::Average);
            let has_column = s.measure_column.as_deref().is_some_and(|c| !c.is_empty());
            if needs_column && !has_column {
                return Err(PivotError::invalid_spec(format!(
                    "{:?} measure for series '{}' requires a column",
                    s.measure_kind,
                    s.display_label()
                )));
            }
        }
        Ok(())
    }
}
