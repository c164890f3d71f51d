//! Ошибки конвейера подготовки данных

use thiserror::Error;

/// Ошибка, которую возвращает оценщик из `fit`/`predict`.
pub type EstimatorError = Box<dyn std::error::Error + Send + Sync>;

pub type Result<T> = std::result::Result<T, PipelineError>;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Нет обязательной колонки или колонка не того типа
    #[error("Schema error: {0}")]
    Schema(String),

    /// Колонки признаков train и test не совпадают
    #[error("Schema mismatch: {0}")]
    SchemaMismatch(String),

    #[error("Empty result: {0}")]
    EmptyResult(String),

    /// Ошибка оценщика передается как есть (доступна через `source()`)
    #[error("Estimator failed: {0}")]
    Estimator(#[source] EstimatorError),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl From<serde_json::Error> for PipelineError {
    fn from(e: serde_json::Error) -> Self {
        PipelineError::Config(e.to_string())
    }
}
