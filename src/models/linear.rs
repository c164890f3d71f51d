//! Линейная регрессия (МНК) через linfa

#![allow(non_snake_case)]

use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_linear::FittedLinearRegression;
use ndarray::{Array1, Array2};

use super::{check_feature_count, Estimator, ModelError};
use crate::error::EstimatorError;

#[derive(Default)]
pub struct LinearRegression {
    fitted: Option<FittedLinearRegression<f64>>,
}

impl LinearRegression {
    pub fn new() -> Self {
        Self { fitted: None }
    }
}

impl Estimator for LinearRegression {
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<(), EstimatorError> {
        if X.nrows() == 0 {
            return Err(ModelError::EmptyDataset.into());
        }

        let dataset = Dataset::new(X.clone(), y.clone());
        let fitted = linfa_linear::LinearRegression::new()
            .fit(&dataset)
            .map_err(|e| ModelError::Linfa(e.to_string()))?;

        self.fitted = Some(fitted);
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>, EstimatorError> {
        let fitted = self.fitted.as_ref().ok_or(ModelError::NotTrained)?;
        check_feature_count(fitted.params().len(), X.ncols())?;
        Ok(fitted.predict(X))
    }
}
