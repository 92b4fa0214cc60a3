use chart_pivot::spec::{
    ChartType, FilterClause, MeasureKind, SeriesSpec, SortConfig, SortMode, StackMode, WidgetSpec,
};
use chart_pivot::types::{DataSet, Value};
use chart_pivot::{PivotOptions, pivot, pivot_with_options};

fn orders() -> DataSet {
    DataSet::from_records(vec![
        vec![("store", Value::from("North")), ("city", Value::from("Oslo")), ("kind", Value::from("web")), ("amount", Value::Int64(40))],
        vec![("store", Value::from("South")), ("city", Value::from("Rome")), ("kind", Value::from("shop")), ("amount", Value::Int64(10))],
        vec![("store", Value::from("North")), ("city", Value::from("Oslo")), ("kind", Value::from("shop")), ("amount", Value::Int64(20))],
        vec![("store", Value::from("South")), ("city", Value::from("Oslo")), ("kind", Value::from("web")), ("amount", Value::Float64(5.5))],
    ])
}

fn two_series() -> WidgetSpec {
    WidgetSpec::multi(
        "store",
        vec![
            SeriesSpec::new("orders", MeasureKind::Count, None),
            SeriesSpec::new("revenue", MeasureKind::Sum, Some("amount")).with_label("Revenue"),
        ],
    )
}

#[test]
fn each_series_writes_its_own_key() {
    let out = pivot(&orders(), &two_series());
    assert_eq!(
        out.to_json_string().unwrap(),
        r#"[{"name":"North","orders":2.0,"revenue":60.0},{"name":"South","orders":2.0,"revenue":15.5}]"#
    );
}

#[test]
fn multi_series_are_never_folded() {
    let mut spec = two_series();
    spec.row_limit = 1;
    spec.fold_remainder = true;
    let out = pivot(&orders(), &spec);
    assert_eq!(out.names(), vec!["North"]);
}

#[test]
fn stacking_multi_series_prefixes_series_id() {
    let mut spec = two_series();
    spec.stack_by_column = Some("kind".to_string());
    spec.stack_mode = StackMode::Stacked;

    let out = pivot(&orders(), &spec);
    let keys: Vec<&str> = out.keys().collect();
    assert_eq!(keys, vec!["orders:shop", "orders:web", "revenue:shop", "revenue:web"]);
    assert_eq!(out.columns[2].label, "Revenue: shop");

    let north = out.row("North").unwrap();
    assert_eq!(north.get("orders:web"), Some(1.0));
    assert_eq!(north.get("revenue:shop"), Some(20.0));
    assert_eq!(north.total, Some(62.0));
}

#[test]
fn value_sort_uses_sum_across_series() {
    let mut spec = two_series();
    spec.sort_config = SortConfig::new(SortMode::ValueAsc);
    assert_eq!(pivot(&orders(), &spec).names(), vec!["South", "North"]);
}

#[test]
fn dimension_override_builds_union_axis() {
    let spec = WidgetSpec::multi(
        "store",
        vec![
            SeriesSpec::new("by_store", MeasureKind::Count, None),
            SeriesSpec::new("by_city", MeasureKind::Count, None)
                .with_dimension_override("city")
                .with_filter(FilterClause::new("kind", "web")),
        ],
    );
    let out = pivot(&orders(), &spec);
    assert_eq!(out.names(), vec!["North", "Oslo", "South"]);
    assert_eq!(out.row("Oslo").unwrap().get("by_city"), Some(2.0));
    assert_eq!(out.row("Oslo").unwrap().get("by_store"), Some(0.0));
    assert_eq!(out.row("South").unwrap().get("by_city"), Some(0.0));
}

#[test]
fn series_without_any_dimension_yields_empty_dataset() {
    let spec = WidgetSpec::multi("", vec![SeriesSpec::new("n", MeasureKind::Count, None)]);
    assert!(pivot(&orders(), &spec).is_empty());
    assert!(pivot(&orders(), &WidgetSpec::multi("store", Vec::new())).is_empty());
}

#[test]
fn kpi_multi_series_single_row() {
    let mut spec = two_series();
    spec.chart_type = ChartType::Kpi;
    spec.dimension.clear();
    let options = PivotOptions {
        kpi_label: "All stores".to_string(),
        ..Default::default()
    };
    let out = pivot_with_options(&orders(), &spec, &options);
    assert_eq!(
        out.to_json_string().unwrap(),
        r#"[{"name":"All stores","orders":4.0,"revenue":75.5}]"#
    );
}
