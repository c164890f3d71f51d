//! Регрессионные модели стоимости операторов

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, ArrayView1, Axis};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{check_feature_count, Estimator, ModelError};
use crate::error::EstimatorError;

/// Ridge Regression в замкнутой форме: (Xc^T Xc + αI)^(-1) Xc^T yc,
/// где Xc, yc - центрированные признаки и цель
#[derive(Debug)]
pub struct RidgeRegression {
    alpha: f64,
    weights: Option<Array1<f64>>,
    bias: f64,
}

impl RidgeRegression {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha,
            weights: None,
            bias: 0.0,
        }
    }

    pub fn weights(&self) -> Option<&Array1<f64>> {
        self.weights.as_ref()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }

    fn solve_linear_system(A: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>, ModelError> {
        // Метод Гаусса с выбором главного элемента
        let n = A.nrows();
        let mut augmented: Array2<f64> = Array2::zeros((n, n + 1));
        augmented.slice_mut(ndarray::s![.., ..n]).assign(A);
        augmented.column_mut(n).assign(b);

        for i in 0..n {
            let max_row = (i..n)
                .max_by(|&a, &b| {
                    augmented[[a, i]]
                        .abs()
                        .total_cmp(&augmented[[b, i]].abs())
                })
                .unwrap_or(i);

            if max_row != i {
                for j in 0..=n {
                    augmented.swap([i, j], [max_row, j]);
                }
            }

            let pivot = augmented[[i, i]];
            if pivot.abs() < 1e-10 {
                return Err(ModelError::SingularMatrix);
            }

            for k in (i + 1)..n {
                let factor = augmented[[k, i]] / pivot;
                for j in i..=n {
                    augmented[[k, j]] -= factor * augmented[[i, j]];
                }
            }
        }

        // Обратный ход
        let mut x = Array1::zeros(n);
        for i in (0..n).rev() {
            let mut sum = augmented[[i, n]];
            for j in (i + 1)..n {
                sum -= augmented[[i, j]] * x[j];
            }
            x[i] = sum / augmented[[i, i]];
        }

        Ok(x)
    }
}

impl Default for RidgeRegression {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl Estimator for RidgeRegression {
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<(), EstimatorError> {
        if X.nrows() == 0 || X.ncols() == 0 {
            return Err(ModelError::EmptyDataset.into());
        }

        let x_mean = X.mean_axis(Axis(0)).ok_or(ModelError::EmptyDataset)?;
        let y_mean = y.mean().ok_or(ModelError::EmptyDataset)?;
        let Xc = X - &x_mean;
        let yc = y - y_mean;

        let mut xtx = Xc.t().dot(&Xc);
        for i in 0..X.ncols() {
            xtx[[i, i]] += self.alpha;
        }
        let xty = Xc.t().dot(&yc);

        let weights = Self::solve_linear_system(&xtx, &xty)?;
        self.bias = y_mean - x_mean.dot(&weights);
        self.weights = Some(weights);

        tracing::debug!("Ridge fitted on {} rows, {} features", X.nrows(), X.ncols());
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>, EstimatorError> {
        let weights = self.weights.as_ref().ok_or(ModelError::NotTrained)?;
        check_feature_count(weights.len(), X.ncols())?;
        Ok(X.dot(weights) + self.bias)
    }
}

/// Регрессионное дерево: разбиение по минимуму суммы квадратов отклонений,
/// пороги выбираются случайно (генератор с фиксированным seed)
#[derive(Debug)]
pub struct RegressionTree {
    max_depth: usize,
    min_samples_split: usize,
    thresholds_per_feature: usize,
    seed: u64,
    n_features: usize,
    root: Option<TreeNode>,
}

#[derive(Debug)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl RegressionTree {
    pub fn new(max_depth: usize, min_samples_split: usize) -> Self {
        Self {
            max_depth,
            min_samples_split,
            thresholds_per_feature: 10,
            seed: 42,
            n_features: 0,
            root: None,
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn build_tree(
        &self,
        X: &Array2<f64>,
        y: &Array1<f64>,
        depth: usize,
        indices: Vec<usize>,
        rng: &mut StdRng,
    ) -> TreeNode {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
        if depth >= self.max_depth || indices.len() < self.min_samples_split {
            return TreeNode::Leaf { value: mean };
        }

        let mut best: Option<(usize, f64, f64)> = None;

        for feature in 0..X.ncols() {
            let (min_val, max_val) = indices.iter().fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), &i| (lo.min(X[[i, feature]]), hi.max(X[[i, feature]])),
            );
            // gen_range паникует на бесконечных границах
            if !min_val.is_finite() || !max_val.is_finite() || (max_val - min_val).abs() < 1e-10 {
                continue;
            }

            for _ in 0..self.thresholds_per_feature {
                let threshold = rng.gen_range(min_val..=max_val);
                let (left, right): (Vec<usize>, Vec<usize>) =
                    indices.iter().partition(|&&i| X[[i, feature]] < threshold);
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let score = sum_squared_error(y, &left) + sum_squared_error(y, &right);
                if best.map_or(true, |(_, _, s)| score < s) {
                    best = Some((feature, threshold, score));
                }
            }
        }

        let Some((feature, threshold, _)) = best else {
            return TreeNode::Leaf { value: mean };
        };

        let (left, right): (Vec<usize>, Vec<usize>) =
            indices.iter().partition(|&&i| X[[i, feature]] < threshold);

        TreeNode::Split {
            feature,
            threshold,
            left: Box::new(self.build_tree(X, y, depth + 1, left, rng)),
            right: Box::new(self.build_tree(X, y, depth + 1, right, rng)),
        }
    }

    fn predict_single(node: &TreeNode, sample: ArrayView1<f64>) -> f64 {
        match node {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] < *threshold {
                    Self::predict_single(left, sample)
                } else {
                    Self::predict_single(right, sample)
                }
            }
        }
    }
}

fn sum_squared_error(y: &Array1<f64>, indices: &[usize]) -> f64 {
    let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
    indices.iter().map(|&i| (y[i] - mean).powi(2)).sum()
}

impl Estimator for RegressionTree {
    fn fit(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<(), EstimatorError> {
        if X.nrows() == 0 {
            return Err(ModelError::EmptyDataset.into());
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        self.root = Some(self.build_tree(X, y, 0, (0..X.nrows()).collect(), &mut rng));
        self.n_features = X.ncols();
        Ok(())
    }

    fn predict(&self, X: &Array2<f64>) -> Result<Array1<f64>, EstimatorError> {
        let root = self.root.as_ref().ok_or(ModelError::NotTrained)?;
        check_feature_count(self.n_features, X.ncols())?;
        Ok(X.rows()
            .into_iter()
            .map(|row| Self::predict_single(root, row))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_ridge_recovers_linear_relation() {
        let X = array![[0.0], [1.0], [2.0], [3.0], [4.0]];
        let y = array![1.0, 3.0, 5.0, 7.0, 9.0];

        let mut model = RidgeRegression::new(1e-6);
        model.fit(&X, &y).unwrap();
        let pred = model.predict(&array![[5.0]]).unwrap();

        assert!((pred[0] - 11.0).abs() < 1e-3, "prediction {}", pred[0]);
    }

    #[test]
    fn test_ridge_handles_all_zero_indicator() {
        let X = array![[1.0, 0.0], [0.0, 0.0], [1.0, 0.0]];
        let y = array![10.0, 20.0, 10.0];

        let mut model = RidgeRegression::default();
        assert!(model.fit(&X, &y).is_ok());
        assert_eq!(model.weights().unwrap()[1], 0.0);
    }

    #[test]
    fn test_ridge_rejects_wrong_width() {
        let mut model = RidgeRegression::default();
        model.fit(&array![[1.0, 2.0], [2.0, 1.0]], &array![1.0, 2.0]).unwrap();
        let err = model.predict(&array![[1.0]]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ModelError>(),
            Some(ModelError::FeatureCount { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_tree_separates_two_groups() {
        let X = array![[0.0], [0.1], [0.2], [0.9], [1.0], [1.1]];
        let y = array![100.0, 100.0, 100.0, 500.0, 500.0, 500.0];

        let mut tree = RegressionTree::new(3, 2).with_seed(7);
        tree.fit(&X, &y).unwrap();
        let pred = tree.predict(&array![[0.05], [1.05]]).unwrap();

        assert_eq!(pred, array![100.0, 500.0]);
    }

    #[test]
    fn test_tree_skips_feature_with_infinite_range() {
        let X = array![[f64::INFINITY, 0.0], [1.0, 0.1], [2.0, 0.9], [3.0, 1.0]];
        let y = array![100.0, 100.0, 500.0, 500.0];

        let mut tree = RegressionTree::new(3, 2).with_seed(7);
        tree.fit(&X, &y).unwrap();
        let pred = tree.predict(&array![[0.0, 0.05], [0.0, 0.95]]).unwrap();

        assert_eq!(pred, array![100.0, 500.0]);
    }

    #[test]
    fn test_tree_not_trained() {
        let tree = RegressionTree::new(3, 2);
        assert!(tree.predict(&array![[1.0]]).is_err());
    }
}
