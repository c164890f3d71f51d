//! Базовая модель: среднее значение целевой переменной

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};

use super::{Estimator, ModelError};
use crate::error::EstimatorError;

#[derive(Debug, Default)]
pub struct MeanBaseline {
    mean: Option<f64>,
}

impl MeanBaseline {
    pub fn new() -> Self {
        Self { mean: None }
    }

    pub fn mean(&self) -> Option<f64> {
        self.mean
    }
}

impl Estimator for MeanBaseline {
    fn fit(&mut self, _X: &Array2<f64>, y: &Array1<f64>) -> Result<(), EstimatorError> {
        self.mean = Some(y.mean().ok_or(ModelError::EmptyDataset)?);
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>, EstimatorError> {
        let mean = self.mean.ok_or(ModelError::NotTrained)?;
        Ok(Array1::from_elem(X.nrows(), mean))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_predicts_training_mean() {
        let mut model = MeanBaseline::new();
        model
            .fit(&Array2::zeros((3, 1)), &array![1.0, 2.0, 6.0])
            .unwrap();

        let pred = model.predict(&Array2::zeros((2, 1))).unwrap();
        assert_eq!(pred, array![3.0, 3.0]);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = MeanBaseline::new();
        let err = model.predict(&Array2::zeros((1, 1))).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::NotTrained)
        ));
    }
}
