use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use fraudml_core::{Classifier, Matrix, Transformer, FEATURE_NAMES, NUM_FEATURES};
use fraudml_pipeline::ScoringPipeline;
use fraudml_preprocessing::StandardScaler;
use fraudml_server::{build_router, AppState};
use fraudml_tree::{BoosterParams, GradientBoostingClassifier};
use http_body_util::BodyExt;
use serde_json::{json, Map, Value};
use tower::ServiceExt;

const V1: usize = 1;
const V2: usize = 2;

/// Router over a model whose fraud signal lives in V1 alone.
fn app() -> Router {
    let rows: Vec<Vec<f64>> = (0..200)
        .map(|i| {
            let mut row: Vec<f64> = (0..NUM_FEATURES).map(|j| ((i * 7 + j * 3) % 5) as f64 * 0.1).collect();
            row[0] = i as f64;
            row[V1] = (i % 20) as f64 - 10.0;
            row
        })
        .collect();
    let labels: Vec<u8> = rows.iter().map(|r| u8::from(r[V1] > 3.0)).collect();

    let raw = Matrix::from_rows(&rows).unwrap();
    let mut scaler = StandardScaler::new();
    let scaled = scaler.fit_transform(&raw).unwrap();
    let mut model = GradientBoostingClassifier::new(BoosterParams {
        n_estimators: 20,
        max_depth: 2,
        ..Default::default()
    });
    model.fit(&scaled, &labels).unwrap();

    build_router(AppState::new(ScoringPipeline::new(scaler, model).unwrap()))
}

fn body_with(v1: f64, v2: f64) -> Map<String, Value> {
    let mut body: Map<String, Value> = FEATURE_NAMES.iter().map(|n| (n.to_string(), json!(0.0))).collect();
    body.insert(FEATURE_NAMES[V1].into(), json!(v1));
    body.insert(FEATURE_NAMES[V2].into(), json!(v2));
    body.insert("Amount".into(), json!(149.62));
    body
}

async fn post(app: &Router, uri: &str, body: impl Into<Body>) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn predict(app: &Router, body: &Map<String, Value>) -> (StatusCode, Value) {
    let (status, text) = post(app, "/predict/", Value::Object(body.clone()).to_string()).await;
    (status, serde_json::from_str(&text).unwrap())
}

#[tokio::test]
async fn test_valid_request_returns_prediction() {
    let app = app();
    let (status, body) = predict(&app, &body_with(8.0, 0.0)).await;
    assert_eq!(status, StatusCode::OK);

    let object = body.as_object().unwrap();
    assert_eq!(object.len(), 2);
    let prediction = object["prediction"].as_u64().unwrap();
    let risk = object["risk_score"].as_f64().unwrap();
    assert_eq!(prediction, 1);
    assert!((0.5..=1.0).contains(&risk));

    let (_, body) = predict(&app, &body_with(-8.0, 0.0)).await;
    assert_eq!(body["prediction"], json!(0));
    assert!(body["risk_score"].as_f64().unwrap() < 0.5);
}

#[tokio::test]
async fn test_prediction_agrees_with_risk_score() {
    let app = app();
    for v1 in [-10.0, -3.0, 0.0, 2.5, 3.5, 4.0, 9.0] {
        let (status, body) = predict(&app, &body_with(v1, 1.0)).await;
        assert_eq!(status, StatusCode::OK);
        let risk = body["risk_score"].as_f64().unwrap();
        let prediction = body["prediction"].as_u64().unwrap();
        assert!((0.0..=1.0).contains(&risk));
        assert_eq!(prediction == 1, risk >= 0.5, "v1={v1}");
    }
}

#[tokio::test]
async fn test_route_without_trailing_slash() {
    let app = app();
    let (status, text) = post(&app, "/predict", Value::Object(body_with(8.0, 0.0)).to_string()).await;
    assert_eq!(status, StatusCode::OK);
    assert!(text.contains("risk_score"));
}

#[tokio::test]
async fn test_missing_amount_is_rejected() {
    let app = app();
    let mut body = body_with(8.0, 0.0);
    body.remove("Amount");
    let (status, errors) = predict(&app, &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors, json!({ "Amount": ["This field is required."] }));
}

#[tokio::test]
async fn test_non_numeric_field_is_rejected() {
    let app = app();
    let mut body = body_with(8.0, 0.0);
    body.insert("V1".into(), json!("abc"));
    let (status, errors) = predict(&app, &body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(errors, json!({ "V1": ["A valid number is required."] }));
}

#[tokio::test]
async fn test_errors_follow_schema_order() {
    let app = app();
    let mut body = body_with(8.0, 0.0);
    body.remove("Time");
    body.remove("Amount");
    body.insert("V3".into(), Value::Null);
    let (status, text) = post(&app, "/predict/", Value::Object(body).to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        text,
        r#"{"Time":["This field is required."],"V3":["This field may not be null."],"Amount":["This field is required."]}"#
    );
}

#[tokio::test]
async fn test_numeric_strings_match_numbers() {
    let app = app();
    let numbers = body_with(5.0, 0.0);
    let mut strings = numbers.clone();
    strings.insert("V1".into(), json!("5.0"));
    strings.insert("Amount".into(), json!("149.62"));
    strings.insert("merchant".into(), json!("ignored"));

    let (_, a) = predict(&app, &numbers).await;
    let (status, b) = predict(&app, &strings).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(a, b);
}

#[tokio::test]
async fn test_swapping_features_changes_score() {
    let app = app();
    let (_, original) = predict(&app, &body_with(8.0, -8.0)).await;
    let (_, swapped) = predict(&app, &body_with(-8.0, 8.0)).await;
    assert_ne!(original["risk_score"], swapped["risk_score"]);
    assert_eq!(original["prediction"], json!(1));
    assert_eq!(swapped["prediction"], json!(0));
}

#[tokio::test]
async fn test_malformed_json() {
    let app = app();
    let (status, text) = post(&app, "/predict/", "{\"Time\": 1,").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body: Value = serde_json::from_str(&text).unwrap();
    assert!(body["detail"].as_str().unwrap().starts_with("JSON parse error - "));
}

#[tokio::test]
async fn test_non_object_body() {
    let app = app();
    let (status, text) = post(&app, "/predict/", "[1, 2, 3]").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        text,
        r#"{"non_field_errors":["Invalid data. Expected a dictionary, but got list."]}"#
    );
}

#[tokio::test]
async fn test_health() {
    let app = app();
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body, json!({ "status": "ok", "n_features": 30 }));
}

#[tokio::test]
async fn test_get_on_predict_is_not_allowed() {
    let app = app();
    let request = Request::builder().uri("/predict/").body(Body::empty()).unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
}
