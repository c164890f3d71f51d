//! HTTP API tests (router driven in-process via tower::ServiceExt)

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use costmodel_ml::server::{router, AppState};
use costmodel_ml::PipelineConfig;

fn app() -> axum::Router {
    router(AppState::new(PipelineConfig::default()))
}

fn scan_record(encoding: &str, time: i64) -> Value {
    json!({
        "operator_type": "TableScan",
        "operator_description": "TableScan a <= 5",
        "execution_time_ns": time,
        "input_rows": 1000,
        "scan_segment_encoding": encoding,
        "second_scan_segment_encoding": "Unencoded",
        "isColumnComparison": false,
        "is_scan_segment_reference_segment": false,
        "is_second_scan_segment_reference_segment": false,
        "scan_segment_data_type": "int",
        "second_scan_segment_data_type": "null",
        "scan_operator_type": "BETWEEN"
    })
}

async fn call(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let (status, body) = call(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_prepare_records() {
    let mut join = scan_record("Dictionary", 5);
    join["operator_type"] = json!("Join");
    let body = json!({
        "records": [scan_record("Dictionary", 120), scan_record("RunLength", 450), join]
    });

    let (status, body) = call(post_json("/api/prepare", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["row_count"], 2);
    let columns: Vec<String> = serde_json::from_value(body["columns"].clone()).unwrap();
    assert!(!columns.contains(&"operator_description".to_string()));
    assert!(columns.contains(&"scan_segment_encoding_FrameOfReference".to_string()));

    let dictionary = columns
        .iter()
        .position(|c| c == "scan_segment_encoding_Dictionary")
        .unwrap();
    assert_eq!(body["rows"][0][dictionary], 1.0);
    assert_eq!(body["rows"][1][dictionary], 0.0);
}

#[tokio::test]
async fn test_prepare_csv_body() {
    let csv = "operator_type,operator_description,execution_time_ns,scan_segment_encoding,\
second_scan_segment_encoding,isColumnComparison,is_scan_segment_reference_segment,\
is_second_scan_segment_reference_segment,scan_segment_data_type,second_scan_segment_data_type,\
scan_operator_type\n\
TableScan,scan,120,Dictionary,Unencoded,False,False,True,int,null,<=\n";

    let request = Request::builder()
        .method("POST")
        .uri("/api/prepare-csv")
        .header("content-type", "text/csv")
        .body(Body::from(csv))
        .unwrap();
    let (status, body) = call(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["row_count"], 1);
}

#[tokio::test]
async fn test_train_predict_with_mean_estimator() {
    let body = json!({
        "estimator": "mean",
        "train": [scan_record("Dictionary", 100), scan_record("RunLength", 300)],
        "test": [scan_record("Dictionary", 0), scan_record("Unencoded", 0), scan_record("RunLength", 0)]
    });

    let (status, body) = call(post_json("/api/train-predict", body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["predictions"], json!([200.0, 200.0, 200.0]));
    let features: Vec<String> = serde_json::from_value(body["feature_columns"].clone()).unwrap();
    assert!(!features.contains(&"execution_time_ns".to_string()));
    assert_eq!(features[0], "input_rows");
    assert!(features.contains(&"scan_segment_encoding_FrameOfReference".to_string()));
}

#[tokio::test]
async fn test_missing_target_is_unprocessable() {
    let body = json!({
        "estimator": "ridge",
        "prepare": false,
        "train": [{"x": 1.0}],
        "test": [{"x": 2.0}]
    });

    let (status, body) = call(post_json("/api/train-predict", body)).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("execution_time_ns"));
}
