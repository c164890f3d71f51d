//! Нормализация признаков: из сырых трасс в таблицу для обучения

use std::collections::BTreeSet;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::preprocessing::domains::CategoricalDomain;
use crate::types::{Column, ColumnData, Table, Value};

pub const OPERATOR_TYPE_COLUMN: &str = "operator_type";

pub struct FeatureNormalizer {
    operator_type: String,
    dropped_columns: Vec<String>,
    domains: Vec<CategoricalDomain>,
}

impl FeatureNormalizer {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            operator_type: config.operator_type.clone(),
            dropped_columns: config.dropped_columns.clone(),
            domains: config.domains.clone(),
        }
    }

    pub fn domains(&self) -> &[CategoricalDomain] {
        &self.domains
    }

    /// Полный конвейер: фильтр → домены → удаление колонок → one-hot → удаление неполных колонок
    pub fn prepare(&self, table: &Table) -> Result<Table> {
        // Тип колонки определяется по всему входу: в пустом срезе значений уже нет
        let text_columns = Self::text_columns(table);
        let filtered = Self::filter_by_operator(table, &self.operator_type)?;
        if filtered.n_rows() == 0 {
            tracing::warn!("No '{}' rows in input of {} rows", self.operator_type, table.n_rows());
        }

        let fixed = Self::fix_categorical_domains(&filtered, &self.domains)?;
        let names: Vec<&str> = self.dropped_columns.iter().map(String::as_str).collect();
        let trimmed = Self::drop_columns(&fixed, &names);
        let expanded = Self::expand_with_text_columns(&trimmed, &text_columns)?;
        let prepared = Self::drop_incomplete_columns(&expanded);

        tracing::info!(
            "Prepared {} '{}' rows: {} columns",
            prepared.n_rows(),
            self.operator_type,
            prepared.n_cols()
        );
        Ok(prepared)
    }

    /// Оставляет строки с `operator_type == operator_type`
    pub fn filter_by_operator(table: &Table, operator_type: &str) -> Result<Table> {
        let column = table.column(OPERATOR_TYPE_COLUMN).ok_or_else(|| {
            PipelineError::Schema(format!("missing column '{}'", OPERATOR_TYPE_COLUMN))
        })?;

        let rows: Vec<usize> = (0..table.n_rows())
            .filter(|&row| column.value(row).label().as_deref() == Some(operator_type))
            .collect();

        tracing::debug!("Filter '{}': {} of {} rows", operator_type, rows.len(), table.n_rows());
        Ok(table.take_rows(&rows))
    }

    /// Переводит перечисленные колонки в категории с заданным доменом.
    /// Значения вне домена становятся пропусками, а не приводятся к ближайшему.
    pub fn fix_categorical_domains(table: &Table, domains: &[CategoricalDomain]) -> Result<Table> {
        for domain in domains {
            if !table.has_column(&domain.column) {
                return Err(PipelineError::Schema(format!(
                    "missing categorical column '{}'",
                    domain.column
                )));
            }
        }

        let columns = table
            .columns()
            .iter()
            .map(|column| match domains.iter().find(|d| d.column == column.name) {
                Some(domain) => Self::fix_column(column, domain),
                None => column.clone(),
            })
            .collect();

        Table::new(columns)
    }

    fn fix_column(column: &Column, domain: &CategoricalDomain) -> Column {
        let mut unknown = 0usize;
        let codes: Vec<Option<usize>> = (0..column.len())
            .map(|row| {
                let value = column.value(row);
                if value.is_missing() {
                    return None;
                }
                let code = domain.code_of_value(&value);
                if code.is_none() {
                    unknown += 1;
                }
                code
            })
            .collect();

        if unknown > 0 {
            tracing::warn!(
                "Column '{}': {} values outside the declared domain",
                column.name,
                unknown
            );
        }

        Column::categorical(column.name.clone(), domain.values.clone(), codes)
    }

    /// Удаляет колонки по имени; отсутствующие имена игнорируются
    pub fn drop_columns(table: &Table, names: &[&str]) -> Table {
        table.select_columns(|c| !names.contains(&c.name.as_str()))
    }

    /// Недекларированные колонки, где есть хотя бы одно нечисловое значение
    pub fn text_columns(table: &Table) -> Vec<String> {
        table
            .columns()
            .iter()
            .filter(|column| match &column.data {
                ColumnData::Values(values) => {
                    values.iter().any(|v| !v.is_missing() && !v.is_numeric())
                }
                ColumnData::Categorical { .. } => false,
            })
            .map(|column| column.name.clone())
            .collect()
    }

    /// One-hot кодирование. Числовые колонки проходят без изменений и идут первыми,
    /// за ними группы индикаторов `<колонка>_<значение>`.
    pub fn expand_categoricals(table: &Table) -> Result<Table> {
        let text_columns = Self::text_columns(table);
        Self::expand_with_text_columns(table, &text_columns)
    }

    /// Текстовая колонка без наблюдаемых меток не дает ни одного индикатора
    fn expand_with_text_columns(table: &Table, text_columns: &[String]) -> Result<Table> {
        let n_rows = table.n_rows();
        let mut passthrough = Vec::new();
        let mut indicators = Vec::new();

        for column in table.columns() {
            match &column.data {
                ColumnData::Categorical { domain, codes } => {
                    for (code, value) in domain.iter().enumerate() {
                        let values = codes
                            .iter()
                            .map(|c| Value::Int(i64::from(*c == Some(code))))
                            .collect();
                        indicators.push(Column::new(format!("{}_{}", column.name, value), values));
                    }
                }
                ColumnData::Values(values) => {
                    if !text_columns.contains(&column.name) {
                        passthrough.push(column.clone());
                        continue;
                    }

                    // Домен не объявлен: берем наблюдаемые метки
                    let labels: BTreeSet<String> = values.iter().filter_map(Value::label).collect();
                    tracing::debug!(
                        "Column '{}' has no declared domain, expanding {} observed values",
                        column.name,
                        labels.len()
                    );
                    let labels: Vec<String> = labels.into_iter().collect();
                    for label in &labels {
                        let indicator = (0..n_rows)
                            .map(|row| {
                                let hit = values[row].label().as_deref() == Some(label.as_str());
                                Value::Int(i64::from(hit))
                            })
                            .collect();
                        indicators.push(Column::new(format!("{}_{}", column.name, label), indicator));
                    }
                }
            }
        }

        passthrough.extend(indicators);
        Table::new(passthrough)
    }

    /// Удаляет целиком каждую колонку, где есть хотя бы один пропуск
    pub fn drop_incomplete_columns(table: &Table) -> Table {
        for column in table.columns().iter().filter(|c| c.has_missing()) {
            tracing::debug!("Dropping incomplete column '{}'", column.name);
        }
        table.select_columns(|c| !c.has_missing())
    }
}

impl Default for FeatureNormalizer {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}
