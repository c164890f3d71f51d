//! Обучение и предсказание на подготовленных таблицах

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use super::Estimator;
use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::preprocessing::ScalingParameters;
use crate::types::{FeatureMatrix, Table, TargetVector};

pub struct TrainingPipeline {
    target_column: String,
    scale_features: bool,
}

impl TrainingPipeline {
    pub fn new(config: &PipelineConfig) -> Self {
        Self {
            target_column: config.target_column.clone(),
            scale_features: config.scale_features,
        }
    }

    /// Имена признаков: все колонки, кроме цели, в исходном порядке
    pub fn feature_columns(&self, table: &Table) -> Vec<String> {
        table
            .column_names()
            .into_iter()
            .filter(|name| *name != self.target_column)
            .map(str::to_string)
            .collect()
    }

    /// Разделение таблицы на признаки и цель с сохранением порядка строк
    pub fn split_features_and_target(&self, table: &Table) -> Result<(FeatureMatrix, TargetVector)> {
        let target_column = table.column(&self.target_column).ok_or_else(|| {
            PipelineError::Schema(format!("missing target column '{}'", self.target_column))
        })?;

        let n_rows = table.n_rows();
        let target: Array1<f64> = (0..n_rows)
            .map(|row| {
                target_column.f64_at(row).ok_or_else(|| {
                    PipelineError::Schema(format!(
                        "target '{}' is not numeric at row {}",
                        self.target_column, row
                    ))
                })
            })
            .collect::<Result<Vec<f64>>>()?
            .into();

        let feature_columns: Vec<_> = table
            .columns()
            .iter()
            .filter(|c| c.name != self.target_column)
            .collect();

        let mut values = Array2::zeros((n_rows, feature_columns.len()));
        for (j, column) in feature_columns.iter().enumerate() {
            for row in 0..n_rows {
                values[[row, j]] = column.f64_at(row).ok_or_else(|| {
                    PipelineError::Schema(format!(
                        "feature '{}' is missing or non-numeric at row {}",
                        column.name, row
                    ))
                })?;
            }
        }

        let features = FeatureMatrix {
            columns: feature_columns.iter().map(|c| c.name.clone()).collect(),
            values,
        };
        Ok((features, target))
    }

    /// Обучает `estimator` на train и возвращает предсказания для test.
    /// Цель test извлекается, но не используется.
    pub fn train_and_predict<E: Estimator + ?Sized>(
        &self,
        estimator: &mut E,
        train: &Table,
        test: &Table,
    ) -> Result<Array1<f64>> {
        let (mut x_train, y_train) = self.split_features_and_target(train)?;
        let (mut x_test, _) = self.split_features_and_target(test)?;

        if x_train.n_rows() == 0 {
            return Err(PipelineError::EmptyResult("training table has no rows".to_string()));
        }
        check_same_columns(&x_train, &x_test)?;

        if self.scale_features {
            let params = ScalingParameters::fit(&x_train)?;
            x_train = params.apply(&x_train)?;
            x_test = params.apply(&x_test)?;
        }

        tracing::info!(
            "Training on {} rows x {} features, predicting {} rows",
            x_train.n_rows(),
            x_train.n_cols(),
            x_test.n_rows()
        );

        estimator
            .fit(&x_train.values, &y_train)
            .map_err(PipelineError::Estimator)?;
        estimator
            .predict(&x_test.values)
            .map_err(PipelineError::Estimator)
    }
}

impl Default for TrainingPipeline {
    fn default() -> Self {
        Self::new(&PipelineConfig::default())
    }
}

fn check_same_columns(train: &FeatureMatrix, test: &FeatureMatrix) -> Result<()> {
    if train.columns == test.columns {
        return Ok(());
    }

    let only_train: Vec<&str> = train
        .columns
        .iter()
        .filter(|c| !test.columns.contains(c))
        .map(String::as_str)
        .collect();
    let only_test: Vec<&str> = test
        .columns
        .iter()
        .filter(|c| !train.columns.contains(c))
        .map(String::as_str)
        .collect();

    let detail = if only_train.is_empty() && only_test.is_empty() {
        "same columns in a different order".to_string()
    } else {
        format!("only in train: {:?}, only in test: {:?}", only_train, only_test)
    };
    Err(PipelineError::SchemaMismatch(detail))
}

/// Случайное разбиение строк на train/test с фиксированным seed
pub fn split_train_test(table: &Table, test_fraction: f64, seed: u64) -> Result<(Table, Table)> {
    if !(0.0..=1.0).contains(&test_fraction) {
        return Err(PipelineError::Config(format!(
            "test_fraction must be in [0, 1], got {}",
            test_fraction
        )));
    }

    let mut rows: Vec<usize> = (0..table.n_rows()).collect();
    rows.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = (table.n_rows() as f64 * test_fraction).round() as usize;
    let (test_rows, train_rows) = rows.split_at(n_test);

    let mut train_rows = train_rows.to_vec();
    let mut test_rows = test_rows.to_vec();
    train_rows.sort_unstable();
    test_rows.sort_unstable();

    Ok((table.take_rows(&train_rows), table.take_rows(&test_rows)))
}
