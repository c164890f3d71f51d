//! End-to-end tests: raw table scan traces → prepared table → predictions

use costmodel_ml::models::MeanBaseline;
use costmodel_ml::preprocessing::table_scan_domains;
use costmodel_ml::{
    scale, Column, FeatureNormalizer, PipelineError, Table, TrainingPipeline, Value,
};

const ENCODINGS: [&str; 5] = [
    "Unencoded",
    "Dictionary",
    "RunLength",
    "FixedStringDictionary",
    "FrameOfReference",
];

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

/// Сырые трассы: две строки TableScan и одна Join
fn raw_traces() -> Table {
    let rows: Vec<(&str, &str, i64)> = vec![
        ("TableScan", "Dictionary", 120),
        ("TableScan", "RunLength", 450),
        ("Join", "Unencoded", 999),
    ];

    let repeat = |v: Value| vec![v; rows.len()];

    Table::new(vec![
        Column::new("operator_type", rows.iter().map(|r| text(r.0)).collect()),
        Column::new("operator_description", repeat(text("TableScan col_a <= 5"))),
        Column::new("execution_time_ns", rows.iter().map(|r| Value::Int(r.2)).collect()),
        Column::new("input_rows", repeat(Value::Int(1000))),
        Column::new("scan_segment_encoding", rows.iter().map(|r| text(r.1)).collect()),
        Column::new("second_scan_segment_encoding", repeat(text("Unencoded"))),
        Column::new("isColumnComparison", repeat(Value::Bool(false))),
        Column::new("is_scan_segment_reference_segment", repeat(Value::Bool(true))),
        Column::new("is_second_scan_segment_reference_segment", repeat(Value::Bool(false))),
        Column::new("scan_segment_data_type", repeat(text("int"))),
        Column::new("second_scan_segment_data_type", repeat(text("null"))),
        Column::new("scan_operator_type", repeat(text("<="))),
    ])
    .unwrap()
}

fn int_at(table: &Table, column: &str, row: usize) -> i64 {
    match table.column(column).unwrap().value(row) {
        Value::Int(v) => v,
        other => panic!("{} is not an integer: {:?}", column, other),
    }
}

#[test]
fn test_prepare_table_scan_scenario() {
    let prepared = FeatureNormalizer::default().prepare(&raw_traces()).unwrap();

    assert_eq!(prepared.n_rows(), 2);
    assert!(!prepared.has_column("operator_description"));
    assert_eq!(int_at(&prepared, "execution_time_ns", 0), 120);
    assert_eq!(int_at(&prepared, "execution_time_ns", 1), 450);

    let encoding_columns: Vec<&str> = prepared
        .column_names()
        .into_iter()
        .filter(|c| c.starts_with("scan_segment_encoding_"))
        .collect();
    assert_eq!(encoding_columns.len(), 5);

    assert_eq!(int_at(&prepared, "scan_segment_encoding_Dictionary", 0), 1);
    assert_eq!(int_at(&prepared, "scan_segment_encoding_RunLength", 0), 0);
    assert_eq!(int_at(&prepared, "scan_segment_encoding_Dictionary", 1), 0);
    assert_eq!(int_at(&prepared, "scan_segment_encoding_RunLength", 1), 1);
    for encoding in ["Unencoded", "FixedStringDictionary", "FrameOfReference"] {
        let name = format!("scan_segment_encoding_{}", encoding);
        assert_eq!(int_at(&prepared, &name, 0), 0);
        assert_eq!(int_at(&prepared, &name, 1), 0);
    }
}

#[test]
fn test_every_declared_domain_value_gets_a_column() {
    let prepared = FeatureNormalizer::default().prepare(&raw_traces()).unwrap();

    for domain in table_scan_domains() {
        for value in &domain.values {
            let name = format!("{}_{}", domain.column, value);
            assert!(prepared.has_column(&name), "missing indicator {}", name);
        }
        let prefix = format!("{}_", domain.column);
        let count = prepared
            .column_names()
            .iter()
            .filter(|c| c.starts_with(&prefix))
            .count();
        assert_eq!(count, domain.values.len(), "indicator count for {}", domain.column);
    }
}

#[test]
fn test_empty_slice_keeps_full_schema() {
    let raw = raw_traces();
    let only_joins = FeatureNormalizer::filter_by_operator(&raw, "Join").unwrap();

    let normalizer = FeatureNormalizer::default();
    let from_scans = normalizer.prepare(&raw).unwrap();
    let from_nothing = normalizer.prepare(&only_joins).unwrap();

    assert_eq!(from_nothing.n_rows(), 0);
    for encoding in ENCODINGS {
        assert!(from_nothing.has_column(&format!("scan_segment_encoding_{}", encoding)));
    }

    let mut expected = vec!["execution_time_ns".to_string(), "input_rows".to_string()];
    for domain in table_scan_domains() {
        for value in &domain.values {
            expected.push(format!("{}_{}", domain.column, value));
        }
    }
    assert_eq!(from_nothing.column_names(), expected);

    // operator_type раскрывается по наблюдаемым значениям: в пустом срезе их нет
    expected.insert(2, "operator_type_TableScan".to_string());
    assert_eq!(from_scans.column_names(), expected);
}

#[test]
fn test_unknown_category_gives_all_zero_indicators() {
    let mut columns = raw_traces().into_columns();
    let operator = columns
        .iter_mut()
        .find(|c| c.name == "scan_operator_type")
        .unwrap();
    *operator = Column::new("scan_operator_type", vec![text(">="), text("Or"), text("Or")]);
    let raw = Table::new(columns).unwrap();

    let prepared = FeatureNormalizer::default().prepare(&raw).unwrap();

    for value in ["<=", "BETWEEN", "Or", "undefined"] {
        let name = format!("scan_operator_type_{}", value);
        assert_eq!(int_at(&prepared, &name, 0), 0, "{}", name);
    }
    assert_eq!(int_at(&prepared, "scan_operator_type_Or", 1), 1);
}

#[test]
fn test_incomplete_numeric_column_is_dropped() {
    let mut columns = raw_traces().into_columns();
    columns.push(Column::new(
        "estimated_cardinality",
        vec![Value::Float(10.0), Value::Missing, Value::Float(3.0)],
    ));
    let raw = Table::new(columns).unwrap();

    let prepared = FeatureNormalizer::default().prepare(&raw).unwrap();

    assert!(!prepared.has_column("estimated_cardinality"));
    assert!(prepared.has_column("input_rows"));
    assert_eq!(prepared.n_rows(), 2);
}

#[test]
fn test_missing_declared_column_is_schema_error() {
    let columns: Vec<Column> = raw_traces()
        .into_columns()
        .into_iter()
        .filter(|c| c.name != "scan_segment_data_type")
        .collect();
    let raw = Table::new(columns).unwrap();

    assert!(matches!(
        FeatureNormalizer::default().prepare(&raw),
        Err(PipelineError::Schema(_))
    ));
}

#[test]
fn test_prepared_table_trains_and_predicts_mean() {
    let prepared = FeatureNormalizer::default().prepare(&raw_traces()).unwrap();
    let pipeline = TrainingPipeline::default();

    let (features, target) = pipeline.split_features_and_target(&prepared).unwrap();
    assert_eq!(features.n_cols() + 1, prepared.n_cols());
    assert_eq!(target.to_vec(), vec![120.0, 450.0]);

    let scaled = scale(&features).unwrap();
    assert_eq!(scaled.columns, features.columns);

    let mut model = MeanBaseline::new();
    let predictions = pipeline
        .train_and_predict(&mut model, &prepared, &prepared)
        .unwrap();
    assert_eq!(predictions.to_vec(), vec![285.0, 285.0]);
}
