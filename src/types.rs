/// Табличная модель данных для трасс операторов

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Значение одной ячейки сырой трассы
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Missing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// Текстовая метка, по которой значение сопоставляется с доменом категории
    pub fn label(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) if !f.is_finite() => None,
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
            Value::Int(i) => Some(*i as f64),
            Value::Float(f) if f.is_finite() => Some(*f),
            _ => None,
        }
    }

    /// NaN и бесконечности считаются пропусками
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing) || matches!(self, Value::Float(f) if !f.is_finite())
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Int(_) | Value::Float(_))
    }

    /// Разбор ячейки CSV
    pub fn parse(cell: &str) -> Self {
        let cell = cell.trim();
        if cell.is_empty() || cell == "NaN" || cell == "NA" {
            return Value::Missing;
        }
        if let Ok(i) = cell.parse::<i64>() {
            return Value::Int(i);
        }
        if let Ok(f) = cell.parse::<f64>() {
            return if f.is_finite() { Value::Float(f) } else { Value::Missing };
        }
        if cell.eq_ignore_ascii_case("true") {
            return Value::Bool(true);
        }
        if cell.eq_ignore_ascii_case("false") {
            return Value::Bool(false);
        }
        Value::Text(cell.to_string())
    }
}

impl From<&serde_json::Value> for Value {
    fn from(v: &serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Missing,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => n.as_f64().map(Value::Float).unwrap_or(Value::Missing),
            },
            serde_json::Value::String(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        }
    }
}

/// Данные колонки: сырые ячейки или категория с фиксированным доменом
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Values(Vec<Value>),
    Categorical {
        domain: Vec<String>,
        /// Индекс в домене; `None` - пропуск или значение вне домена
        codes: Vec<Option<usize>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Values(values),
        }
    }

    pub fn categorical(name: impl Into<String>, domain: Vec<String>, codes: Vec<Option<usize>>) -> Self {
        Self {
            name: name.into(),
            data: ColumnData::Categorical { domain, codes },
        }
    }

    pub fn len(&self) -> usize {
        match &self.data {
            ColumnData::Values(values) => values.len(),
            ColumnData::Categorical { codes, .. } => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match &self.data {
            ColumnData::Values(values) => values[row].is_missing(),
            ColumnData::Categorical { codes, .. } => codes[row].is_none(),
        }
    }

    pub fn has_missing(&self) -> bool {
        (0..self.len()).any(|row| self.is_missing(row))
    }

    /// Ячейка в виде `Value` (категория отдается своей меткой)
    pub fn value(&self, row: usize) -> Value {
        match &self.data {
            ColumnData::Values(values) => values[row].clone(),
            ColumnData::Categorical { domain, codes } => match codes[row] {
                Some(code) => Value::Text(domain[code].clone()),
                None => Value::Missing,
            },
        }
    }

    /// Числовое значение ячейки, если оно есть
    pub fn f64_at(&self, row: usize) -> Option<f64> {
        match &self.data {
            ColumnData::Values(values) => values[row].as_f64(),
            ColumnData::Categorical { .. } => None,
        }
    }

    pub fn take(&self, rows: &[usize]) -> Column {
        let data = match &self.data {
            ColumnData::Values(values) => {
                ColumnData::Values(rows.iter().map(|&r| values[r].clone()).collect())
            }
            ColumnData::Categorical { domain, codes } => ColumnData::Categorical {
                domain: domain.clone(),
                codes: rows.iter().map(|&r| codes[r]).collect(),
            },
        };
        Column {
            name: self.name.clone(),
            data,
        }
    }
}

/// Колоночная таблица; все колонки одной длины
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Table {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(Column::len).unwrap_or(0);
        if let Some(bad) = columns.iter().find(|c| c.len() != n_rows) {
            return Err(PipelineError::Schema(format!(
                "column '{}' has {} rows, expected {}",
                bad.name,
                bad.len(),
                n_rows
            )));
        }
        for (i, column) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name == column.name) {
                return Err(PipelineError::Schema(format!(
                    "duplicate column '{}'",
                    column.name
                )));
            }
        }
        Ok(Self { columns, n_rows })
    }

    /// Сборка таблицы из JSON-записей; порядок колонок - порядок первого появления ключа
    pub fn from_records(records: &[serde_json::Map<String, serde_json::Value>]) -> Self {
        let mut names: Vec<String> = Vec::new();
        for record in records {
            for key in record.keys() {
                if !names.contains(key) {
                    names.push(key.clone());
                }
            }
        }

        let columns = names
            .into_iter()
            .map(|name| {
                let values = records
                    .iter()
                    .map(|r| r.get(&name).map(Value::from).unwrap_or(Value::Missing))
                    .collect();
                Column::new(name, values)
            })
            .collect();

        Self {
            columns,
            n_rows: records.len(),
        }
    }

    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn into_columns(self) -> Vec<Column> {
        self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Копия таблицы только с колонками, для которых `keep` вернул true
    pub fn select_columns(&self, keep: impl Fn(&Column) -> bool) -> Table {
        Table {
            columns: self.columns.iter().filter(|c| keep(c)).cloned().collect(),
            n_rows: self.n_rows,
        }
    }

    pub fn take_rows(&self, rows: &[usize]) -> Table {
        Table {
            columns: self.columns.iter().map(|c| c.take(rows)).collect(),
            n_rows: rows.len(),
        }
    }

    /// Строки в виде `f64`; нечисловые ячейки дают ошибку схемы
    pub fn to_f64_rows(&self) -> Result<Vec<Vec<f64>>> {
        (0..self.n_rows)
            .map(|row| {
                self.columns
                    .iter()
                    .map(|c| {
                        c.f64_at(row).ok_or_else(|| {
                            PipelineError::Schema(format!(
                                "column '{}' has a non-numeric value at row {}",
                                c.name, row
                            ))
                        })
                    })
                    .collect()
            })
            .collect()
    }
}

/// Плотная матрица признаков вместе с именами колонок
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    pub columns: Vec<String>,
    pub values: Array2<f64>,
}

impl FeatureMatrix {
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }
}

pub type TargetVector = Array1<f64>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreparedTableOutput {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
    pub row_count: usize,
}

impl PreparedTableOutput {
    pub fn from_table(table: &Table) -> Result<Self> {
        Ok(Self {
            columns: table.column_names().iter().map(|s| s.to_string()).collect(),
            rows: table.to_f64_rows()?,
            row_count: table.n_rows(),
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionOutput {
    pub feature_columns: Vec<String>,
    pub predictions: Vec<f64>,
}
