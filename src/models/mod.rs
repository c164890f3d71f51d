/// Оценщики и обертка обучения/предсказания

pub mod baseline;
pub mod linear;
pub mod regression;
pub mod training;

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::EstimatorError;

pub use baseline::MeanBaseline;
pub use linear::LinearRegression;
pub use regression::{RegressionTree, RidgeRegression};
pub use training::TrainingPipeline;

/// Любая модель с циклом fit/predict. `fit` меняет модель на месте.
pub trait Estimator {
    fn fit(&mut self, features: &Array2<f64>, target: &Array1<f64>) -> Result<(), EstimatorError>;

    fn predict(&self, features: &Array2<f64>) -> Result<Array1<f64>, EstimatorError>;
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Empty dataset")]
    EmptyDataset,

    #[error("Model not trained")]
    NotTrained,

    #[error("Singular matrix")]
    SingularMatrix,

    #[error("Expected {expected} features, got {actual}")]
    FeatureCount { expected: usize, actual: usize },

    #[error("linfa: {0}")]
    Linfa(String),
}

/// Выбор оценщика по имени (для API)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EstimatorKind {
    Mean,
    #[default]
    Ridge,
    Linear,
    Tree,
}

impl EstimatorKind {
    pub fn build(self) -> Box<dyn Estimator + Send> {
        match self {
            EstimatorKind::Mean => Box::new(MeanBaseline::new()),
            EstimatorKind::Ridge => Box::new(RidgeRegression::new(1.0)),
            EstimatorKind::Linear => Box::new(LinearRegression::new()),
            EstimatorKind::Tree => Box::new(RegressionTree::new(10, 5)),
        }
    }
}

pub(crate) fn check_feature_count(expected: usize, actual: usize) -> Result<(), ModelError> {
    if expected != actual {
        return Err(ModelError::FeatureCount { expected, actual });
    }
    Ok(())
}
