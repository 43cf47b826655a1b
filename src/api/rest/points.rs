use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::provider::FulfillmentProvider;
use crate::shipx::types::{Point, TrackingInfo};
use crate::shipx::PointFilter;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/store/inpost/points", get(find_points))
        .route("/store/inpost/tracking/:tracking_number", get(get_tracking))
}

#[derive(Debug, Deserialize)]
pub struct PointsQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<u32>,
    pub city: Option<String>,
    pub name: Option<String>,
}

#[derive(Serialize)]
pub struct PointsResponse {
    pub points: Vec<Point>,
    pub count: usize,
}

/// Raw point search: exact name lookup, proximity, or city. Unlike
/// the lockers endpoint, results keep the courier's wire shape.
async fn find_points(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PointsQuery>,
) -> Json<PointsResponse> {
    let points = if let Some(name) = &query.name {
        state.shipx.get_point(name).await.into_iter().collect()
    } else if let (Some(latitude), Some(longitude)) = (query.latitude, query.longitude) {
        state
            .shipx
            .find_points(&PointFilter::near(latitude, longitude, query.radius))
            .await
    } else if let Some(city) = &query.city {
        state.shipx.find_points(&PointFilter::in_city(city)).await
    } else {
        Vec::new()
    };

    Json(PointsResponse {
        count: points.len(),
        points,
    })
}

async fn get_tracking(
    State(state): State<Arc<AppState>>,
    Path(tracking_number): Path<String>,
) -> Result<Json<TrackingInfo>, AppError> {
    let tracking = state.provider.get_tracking_info(&tracking_number).await?;
    Ok(Json(tracking))
}
