use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{ws::WebSocketUpgrade, ConnectInfo, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

use super::session::run_session;
use crate::pipeline::{InferencePipeline, ModelStatus};

pub const PREDICT_PATH: &str = "/ws/predict";
pub const HEALTH_PATH: &str = "/health";

/// Shared by every connection. The pipeline only holds read-only model state.
#[derive(Clone)]
pub struct AppState {
    pub pipeline: InferencePipeline,
    pub status: Arc<ModelStatus>,
}

impl AppState {
    pub fn new(pipeline: InferencePipeline, status: ModelStatus) -> Self {
        Self {
            pipeline,
            status: Arc::new(status),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(PREDICT_PATH, get(ws_predict))
        .route(HEALTH_PATH, get(health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn ws_predict(
    ws: WebSocketUpgrade,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    ws.on_upgrade(move |socket| run_session(socket, state.pipeline, peer))
}

async fn health(State(state): State<AppState>) -> Response {
    let classes = state.pipeline.labels().class_count();
    match state.status.as_ref() {
        ModelStatus::Ready { name } => (
            StatusCode::OK,
            Json(json!({ "status": "ok", "model": name, "classes": classes })),
        )
            .into_response(),
        ModelStatus::Unavailable { reason } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "degraded", "reason": reason, "classes": classes })),
        )
            .into_response(),
    }
}

/// Serve on an already-bound listener until `shutdown` resolves.
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let addr = listener.local_addr().context("listener has no local address")?;
    info!("Listening on ws://{}{}", addr, PREDICT_PATH);

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .context("server error")?;

    info!("Server stopped");
    Ok(())
}
