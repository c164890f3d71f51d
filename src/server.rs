/// HTTP API над конвейером подготовки данных и обучения

use std::sync::Arc;

use axum::{
    extract::State,
    http::{Method, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::loader::read_csv;
use crate::models::{EstimatorKind, TrainingPipeline};
use crate::preprocessing::FeatureNormalizer;
use crate::types::{PredictionOutput, PreparedTableOutput, Table};

pub type Record = serde_json::Map<String, serde_json::Value>;

#[derive(Clone)]
pub struct AppState {
    config: Arc<PipelineConfig>,
}

impl AppState {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PrepareRequest {
    pub records: Vec<Record>,
}

#[derive(Debug, Deserialize)]
pub struct TrainPredictRequest {
    #[serde(default)]
    pub estimator: EstimatorKind,
    pub train: Vec<Record>,
    pub test: Vec<Record>,
    /// false - записи уже подготовлены
    #[serde(default = "default_prepare")]
    pub prepare: bool,
}

fn default_prepare() -> bool { true }

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub struct ApiError(PipelineError);

impl From<PipelineError> for ApiError {
    fn from(e: PipelineError) -> Self {
        ApiError(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            PipelineError::Schema(_) | PipelineError::SchemaMismatch(_) | PipelineError::Csv(_) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            PipelineError::EmptyResult(_) | PipelineError::Config(_) => StatusCode::BAD_REQUEST,
            PipelineError::Estimator(_) | PipelineError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        tracing::warn!("Request failed ({}): {}", status, self.0);
        (status, Json(ErrorBody { error: self.0.to_string() })).into_response()
    }
}

pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/prepare", post(prepare))
        .route("/api/prepare-csv", post(prepare_csv))
        .route("/api/train-predict", post(train_predict))
        .layer(cors)
        .with_state(state)
}

async fn root() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "message": "Cost model training pipeline",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn prepare(
    State(state): State<AppState>,
    Json(data): Json<PrepareRequest>,
) -> Result<Json<PreparedTableOutput>, ApiError> {
    tracing::info!("Prepare request: {} records", data.records.len());

    let raw = Table::from_records(&data.records);
    let prepared = FeatureNormalizer::new(&state.config).prepare(&raw)?;
    Ok(Json(PreparedTableOutput::from_table(&prepared)?))
}

async fn prepare_csv(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<PreparedTableOutput>, ApiError> {
    let raw = read_csv(body.as_bytes())?;
    tracing::info!("Prepare CSV request: {} rows", raw.n_rows());

    let prepared = FeatureNormalizer::new(&state.config).prepare(&raw)?;
    Ok(Json(PreparedTableOutput::from_table(&prepared)?))
}

async fn train_predict(
    State(state): State<AppState>,
    Json(data): Json<TrainPredictRequest>,
) -> Result<Json<PredictionOutput>, ApiError> {
    tracing::info!(
        "Train/predict request: {:?}, {} train, {} test records",
        data.estimator,
        data.train.len(),
        data.test.len()
    );

    let mut train = Table::from_records(&data.train);
    let mut test = Table::from_records(&data.test);
    if data.prepare {
        let normalizer = FeatureNormalizer::new(&state.config);
        train = normalizer.prepare(&train)?;
        test = normalizer.prepare(&test)?;
    }

    let pipeline = TrainingPipeline::new(&state.config);

    // Оценщик создается на каждый запрос и не разделяется между запросами
    let mut estimator = data.estimator.build();
    let predictions = pipeline.train_and_predict(estimator.as_mut(), &train, &test)?;

    Ok(Json(PredictionOutput {
        feature_columns: pipeline.feature_columns(&train),
        predictions: predictions.to_vec(),
    }))
}
