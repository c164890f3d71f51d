/// Модуль предобработки данных

pub mod domains;
pub mod feature_engineering;
pub mod normalization;

pub use domains::{table_scan_domains, CategoricalDomain};
pub use feature_engineering::FeatureNormalizer;
pub use normalization::{scale, ScalingParameters};
