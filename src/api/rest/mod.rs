pub mod fulfillments;
pub mod lockers;
pub mod points;
pub mod webhooks;

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use uuid::Uuid;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    // The storefront calls the search endpoints cross-origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(lockers::router())
        .merge(points::router())
        .merge(webhooks::router())
        .merge(fulfillments::router())
        .route("/health", get(health))
        .route("/metrics", get(metrics))
        .layer(cors)
        .with_state(state)
}

/// Short correlation id tagging every log line of one request.
pub(crate) fn request_id() -> String {
    let mut id = Uuid::new_v4().simple().to_string();
    id.truncate(6);
    id
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    fulfillments: usize,
}

async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        fulfillments: state.fulfillments.len(),
    })
}

async fn metrics(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.metrics.encode() {
        Ok(body) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            body,
        )
            .into_response(),
        Err(err) => (StatusCode::INTERNAL_SERVER_ERROR, err).into_response(),
    }
}
