use axum::body::Bytes;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ServiceError;
use crate::state::AppState;
use crate::validation::parse_features;

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: u8,
    pub risk_score: f64,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub n_features: usize,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/predict/", post(handle_predict))
        .route("/predict", post(handle_predict))
        .route("/health", get(handle_health))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, state: AppState) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "prediction service listening");
    }
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("shutdown signal received");
    }
}

async fn handle_predict(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<PredictResponse>, ServiceError> {
    let features = parse_features(&body)?;
    let prediction = state.pipeline.predict_one(&features)?;
    info!(prediction = prediction.label, risk_score = prediction.risk_score, "prediction served");
    Ok(Json(PredictResponse {
        prediction: prediction.label,
        risk_score: prediction.risk_score,
    }))
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        n_features: state.pipeline.n_features(),
    })
}
