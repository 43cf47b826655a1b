use std::sync::Arc;

use axum::extract::{Query, State};
use axum::routing::get;
use axum::Json;
use axum::Router;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::api::rest::request_id;
use crate::models::locker::Locker;
use crate::shipx::PointFilter;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/store/inpost/lockers", get(search_lockers))
}

#[derive(Debug, Deserialize)]
pub struct LockerSearchQuery {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country_code: Option<String>,
    pub radius: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize)]
pub struct LockersResponse {
    pub lockers: Vec<Locker>,
    pub total: usize,
    pub request_id: String,
}

/// Storefront locker search: forwards the filter to the courier's
/// points directory and reshapes the results.
async fn search_lockers(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LockerSearchQuery>,
) -> Json<LockersResponse> {
    let request_id = request_id();

    info!(
        request_id,
        latitude = ?query.latitude,
        longitude = ?query.longitude,
        city = query.city.as_deref(),
        postcode = query.postcode.as_deref(),
        "locker search started"
    );

    let filter = PointFilter {
        latitude: query.latitude,
        longitude: query.longitude,
        radius: query.radius,
        city: query.city,
        postcode: query.postcode,
        country_code: Some(query.country_code.unwrap_or_else(|| "PL".to_string())),
        limit: query.limit,
    };

    let points = state.shipx.find_points(&filter).await;

    let outcome = if points.is_empty() { "empty" } else { "success" };
    state
        .metrics
        .locker_searches_total
        .with_label_values(&[outcome])
        .inc();

    let lockers: Vec<Locker> = points.into_iter().map(Locker::from).collect();

    for locker in &lockers {
        if locker.address.city.is_empty() {
            warn!(request_id, locker = %locker.name, "locker missing city");
        }
    }

    info!(request_id, total = lockers.len(), "locker search finished");

    Json(LockersResponse {
        total: lockers.len(),
        lockers,
        request_id,
    })
}
