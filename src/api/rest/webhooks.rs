use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::AppError;
use crate::models::fulfillment::Fulfillment;
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/webhooks/inpost", post(handle_webhook))
}

/// Status push from the courier. No signature scheme exists for these;
/// the endpoint is trusted by network placement.
#[derive(Debug, Deserialize)]
pub struct InpostWebhookEvent {
    pub shipment_id: Option<String>,
    pub status: Option<String>,
    pub tracking_number: Option<String>,
}

#[derive(Serialize)]
pub struct WebhookResponse {
    pub message: &'static str,
}

async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    Json(event): Json<InpostWebhookEvent>,
) -> Result<Json<WebhookResponse>, AppError> {
    let shipment_id = event
        .shipment_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::InvalidData("missing required webhook data".to_string()))?;
    let status = event
        .status
        .filter(|status| !status.is_empty())
        .ok_or_else(|| AppError::InvalidData("missing required webhook data".to_string()))?;

    info!(shipment_id, status, "InPost webhook received");

    // Records are matched on the shipment id stored in metadata; the
    // courier may reference shipments this gateway never saw.
    let mut updated: Option<Fulfillment> = None;
    for mut entry in state.fulfillments.iter_mut() {
        if entry.metadata.inpost_shipment_id.as_deref() == Some(shipment_id.as_str()) {
            entry.metadata.inpost_status = Some(status.clone());
            if let Some(tracking_number) = &event.tracking_number {
                entry.metadata.tracking_number = Some(tracking_number.clone());
            }
            entry.metadata.last_webhook_update = Some(Utc::now());
            updated = Some(entry.clone());
            break;
        }
    }

    let Some(fulfillment) = updated else {
        info!(shipment_id, "no fulfillment found for InPost shipment");
        state
            .metrics
            .webhook_events_total
            .with_label_values(&["unmatched"])
            .inc();
        return Err(AppError::NotFound("fulfillment not found".to_string()));
    };

    state
        .metrics
        .webhook_events_total
        .with_label_values(&["applied"])
        .inc();

    info!(
        fulfillment_id = %fulfillment.id,
        shipment_id,
        status,
        "updated fulfillment from InPost webhook"
    );

    Ok(Json(WebhookResponse {
        message: "webhook processed successfully",
    }))
}
