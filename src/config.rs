/// Конфигурация конвейера

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};
use crate::preprocessing::domains::{table_scan_domains, CategoricalDomain};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_operator_type")]
    pub operator_type: String,
    #[serde(default = "default_target_column")]
    pub target_column: String,
    #[serde(default = "default_dropped_columns")]
    pub dropped_columns: Vec<String>,
    #[serde(default = "table_scan_domains")]
    pub domains: Vec<CategoricalDomain>,
    /// Стандартизация признаков внутри train_and_predict (параметры берутся с train)
    #[serde(default)]
    pub scale_features: bool,
}

fn default_operator_type() -> String { "TableScan".to_string() }
fn default_target_column() -> String { "execution_time_ns".to_string() }
fn default_dropped_columns() -> Vec<String> { vec!["operator_description".to_string()] }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            operator_type: default_operator_type(),
            target_column: default_target_column(),
            dropped_columns: default_dropped_columns(),
            domains: table_scan_domains(),
            scale_features: false,
        }
    }
}

impl PipelineConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: PipelineConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.target_column.is_empty() {
            return Err(PipelineError::Config("target_column must not be empty".to_string()));
        }
        if self.dropped_columns.contains(&self.target_column) {
            return Err(PipelineError::Config(format!(
                "target column '{}' is listed in dropped_columns",
                self.target_column
            )));
        }
        for domain in &self.domains {
            if domain.values.is_empty() {
                return Err(PipelineError::Config(format!(
                    "domain for '{}' is empty",
                    domain.column
                )));
            }
            if domain.column == self.target_column {
                return Err(PipelineError::Config(format!(
                    "target column '{}' cannot be categorical",
                    domain.column
                )));
            }
        }
        Ok(())
    }
}
