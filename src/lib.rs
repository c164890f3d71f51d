//! Подготовка трасс операторов для обучения модели стоимости

pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod preprocessing;
pub mod server;
pub mod types;

pub use config::PipelineConfig;
pub use error::{EstimatorError, PipelineError, Result};
pub use models::{Estimator, EstimatorKind, TrainingPipeline};
pub use preprocessing::{scale, FeatureNormalizer, ScalingParameters};
pub use types::*;
