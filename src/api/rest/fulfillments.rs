use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::fulfillment::Fulfillment;
use crate::models::order::{LineItem, Order, ShippingAddress};
use crate::provider::{
    CalculatedPrice, DocumentType, FulfillmentOption, FulfillmentProvider, SelectionData,
};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/store/shipping-options", get(list_shipping_options))
        .route("/store/shipping-options/price", post(calculate_price))
        .route("/admin/fulfillments", post(create_fulfillment))
        .route("/admin/fulfillments/:id", get(get_fulfillment))
        .route("/admin/fulfillments/:id/cancel", post(cancel_fulfillment))
        .route("/admin/fulfillments/:id/label", get(get_label))
}

#[derive(Debug, Deserialize)]
pub struct ShippingOptionsQuery {
    pub country_code: Option<String>,
}

async fn list_shipping_options(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ShippingOptionsQuery>,
) -> Json<Vec<FulfillmentOption>> {
    let address = ShippingAddress {
        country_code: query.country_code,
        ..ShippingAddress::default()
    };

    let options = if state.provider.is_applicable(Some(&address)) {
        state.provider.list_options()
    } else {
        Vec::new()
    };

    Json(options)
}

#[derive(Debug, Deserialize)]
pub struct PriceRequest {
    #[serde(default)]
    pub items: Vec<LineItem>,
}

async fn calculate_price(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PriceRequest>,
) -> Json<CalculatedPrice> {
    Json(state.provider.calculate_price(&payload.items))
}

#[derive(Debug, Deserialize)]
pub struct CreateFulfillmentRequest {
    pub order: Order,
    #[serde(default)]
    pub items: Vec<LineItem>,
    #[serde(default)]
    pub data: SelectionData,
}

async fn create_fulfillment(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateFulfillmentRequest>,
) -> Result<Json<Fulfillment>, AppError> {
    // Reject bad input before the locker lookup round-trip.
    if payload.order.shipping_address.is_none() {
        state
            .metrics
            .shipment_operations_total
            .with_label_values(&["create", "rejected"])
            .inc();
        return Err(AppError::InvalidData(
            "order must have a shipping address".to_string(),
        ));
    }

    // A shipment may only target a locker that is currently operating.
    let validated = state.provider.validate_selection(&payload.data).await?;

    let mut fulfillment = Fulfillment::new(payload.order.id.clone());

    let result = match state
        .provider
        .create_fulfillment(&payload.data, &payload.items, &payload.order, &fulfillment)
        .await
    {
        Ok(result) => result,
        Err(err) => {
            state
                .metrics
                .shipment_operations_total
                .with_label_values(&["create", "error"])
                .inc();
            return Err(err);
        }
    };

    fulfillment.metadata = result.data;
    fulfillment.metadata.point_name = Some(validated.point_name);
    fulfillment.metadata.point_address = Some(validated.point_address);

    state
        .fulfillments
        .insert(fulfillment.id, fulfillment.clone());
    state.metrics.fulfillments_open.inc();
    state
        .metrics
        .shipment_operations_total
        .with_label_values(&["create", "success"])
        .inc();

    info!(
        fulfillment_id = %fulfillment.id,
        shipment_id = fulfillment.metadata.inpost_shipment_id.as_deref().unwrap_or(""),
        "fulfillment created"
    );

    Ok(Json(fulfillment))
}

async fn get_fulfillment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Fulfillment>, AppError> {
    let fulfillment = state
        .fulfillments
        .get(&id)
        .ok_or_else(|| AppError::NotFound(format!("fulfillment {} not found", id)))?;

    Ok(Json(fulfillment.value().clone()))
}

async fn cancel_fulfillment(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Fulfillment>, AppError> {
    let fulfillment = state
        .fulfillments
        .get(&id)
        .map(|entry| entry.value().clone())
        .ok_or_else(|| AppError::NotFound(format!("fulfillment {} not found", id)))?;

    let cancelled_at = match state.provider.cancel_fulfillment(&fulfillment).await {
        Ok(cancelled_at) => cancelled_at,
        Err(err) => {
            state
                .metrics
                .shipment_operations_total
                .with_label_values(&["cancel", "error"])
                .inc();
            return Err(err);
        }
    };

    let mut updated = fulfillment;
    updated.cancelled_at = Some(cancelled_at);
    state.fulfillments.insert(updated.id, updated.clone());
    state
        .metrics
        .shipment_operations_total
        .with_label_values(&["cancel", "success"])
        .inc();

    Ok(Json(updated))
}

async fn get_label(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let metadata = state
        .fulfillments
        .get(&id)
        .map(|entry| entry.value().metadata.clone())
        .ok_or_else(|| AppError::NotFound(format!("fulfillment {} not found", id)))?;

    let label = state
        .provider
        .retrieve_documents(&metadata, DocumentType::Label)
        .await?
        .ok_or_else(|| AppError::NotFound("label not available".to_string()))?;

    Ok((
        StatusCode::OK,
        [("content-type", "application/pdf")],
        label,
    ))
}
