//! Стандартизация признаков

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};

use crate::error::{PipelineError, Result};
use crate::types::FeatureMatrix;

/// Среднее и стандартное отклонение каждой колонки, посчитанные на обучающей выборке.
/// Одни и те же параметры применяются и к train, и к test.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalingParameters {
    columns: Vec<String>,
    mean: Array1<f64>,
    std: Array1<f64>,
}

impl ScalingParameters {
    pub fn fit(features: &FeatureMatrix) -> Result<Self> {
        let X = &features.values;
        if X.nrows() == 0 {
            return Err(PipelineError::EmptyResult(
                "cannot fit scaling parameters on zero rows".to_string(),
            ));
        }

        let mean = X
            .mean_axis(Axis(0))
            .ok_or_else(|| PipelineError::EmptyResult("failed to compute mean".to_string()))?;
        let mut std = X.std_axis(Axis(0), 0.0);

        // Постоянные колонки не масштабируем, они станут нулевыми
        for val in std.iter_mut() {
            if *val < 1e-10 {
                *val = 1.0;
            }
        }

        Ok(Self {
            columns: features.columns.clone(),
            mean,
            std,
        })
    }

    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    pub fn std(&self) -> &Array1<f64> {
        &self.std
    }

    pub fn apply(&self, features: &FeatureMatrix) -> Result<FeatureMatrix> {
        if features.columns != self.columns {
            return Err(PipelineError::SchemaMismatch(format!(
                "scaling fitted on {} columns, got {}",
                self.columns.len(),
                features.columns.len()
            )));
        }

        // (X - mean) / std
        let mut normalized: Array2<f64> = features.values.clone();
        for mut row in normalized.rows_mut() {
            for (i, val) in row.iter_mut().enumerate() {
                *val = (*val - self.mean[i]) / self.std[i];
            }
        }

        Ok(FeatureMatrix {
            columns: features.columns.clone(),
            values: normalized,
        })
    }
}

/// Масштабирование без состояния: статистики считаются заново по переданным строкам.
/// Для согласованного масштабирования train/test используйте `ScalingParameters`.
pub fn scale(features: &FeatureMatrix) -> Result<FeatureMatrix> {
    ScalingParameters::fit(features)?.apply(features)
}
