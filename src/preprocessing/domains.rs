//! Фиксированные домены категориальных колонок трасс TableScan
//!
//! Набор индикаторных колонок определяется только этими списками, а не
//! значениями, встретившимися в данных.

use serde::{Deserialize, Serialize};

use crate::types::Value;

pub const ENCODING_CATEGORIES: &[&str] = &[
    "Unencoded",
    "Dictionary",
    "RunLength",
    "FixedStringDictionary",
    "FrameOfReference",
];

pub const BOOLEAN_CATEGORIES: &[&str] = &["false", "true"];

pub const DATA_TYPE_CATEGORIES: &[&str] = &["null", "int", "long", "float", "double", "string"];

pub const SCAN_OPERATOR_CATEGORIES: &[&str] = &["<=", "BETWEEN", "Or", "undefined"];

/// Упорядоченный домен одной колонки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoricalDomain {
    pub column: String,
    pub values: Vec<String>,
}

impl CategoricalDomain {
    pub fn new(column: &str, values: &[&str]) -> Self {
        Self {
            column: column.to_string(),
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    pub fn code_of(&self, label: &str) -> Option<usize> {
        self.values.iter().position(|v| v == label)
    }

    pub fn is_boolean(&self) -> bool {
        self.values.iter().map(String::as_str).eq(BOOLEAN_CATEGORIES.iter().copied())
    }

    /// Код ячейки в домене. В булевом домене `0`/`1` равны `false`/`true`.
    pub fn code_of_value(&self, value: &Value) -> Option<usize> {
        if self.is_boolean() {
            let flag = match value {
                Value::Bool(b) => Some(*b),
                Value::Int(0) => Some(false),
                Value::Int(1) => Some(true),
                Value::Float(f) if *f == 0.0 => Some(false),
                Value::Float(f) if *f == 1.0 => Some(true),
                _ => None,
            };
            if let Some(flag) = flag {
                return self.code_of(if flag { "true" } else { "false" });
            }
        }
        self.code_of(&value.label()?)
    }
}

/// Домены всех категориальных колонок TableScan, в порядке колонок
pub fn table_scan_domains() -> Vec<CategoricalDomain> {
    vec![
        CategoricalDomain::new("scan_segment_encoding", ENCODING_CATEGORIES),
        CategoricalDomain::new("second_scan_segment_encoding", ENCODING_CATEGORIES),
        CategoricalDomain::new("isColumnComparison", BOOLEAN_CATEGORIES),
        CategoricalDomain::new("is_scan_segment_reference_segment", BOOLEAN_CATEGORIES),
        CategoricalDomain::new("is_second_scan_segment_reference_segment", BOOLEAN_CATEGORIES),
        CategoricalDomain::new("scan_segment_data_type", DATA_TYPE_CATEGORIES),
        CategoricalDomain::new("second_scan_segment_data_type", DATA_TYPE_CATEGORIES),
        CategoricalDomain::new("scan_operator_type", SCAN_OPERATOR_CATEGORIES),
    ]
}
