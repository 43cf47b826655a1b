use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::locker::LockerAddress;

/// Courier-related state carried on a fulfillment record. The host
/// platform persists this as opaque metadata; the webhook receiver
/// reconciles events against `inpost_shipment_id`.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FulfillmentMetadata {
    pub inpost_shipment_id: Option<String>,
    pub inpost_status: Option<String>,
    pub tracking_number: Option<String>,
    pub tracking_url: Option<String>,
    pub target_point: Option<String>,
    pub service: Option<String>,
    pub label_url: Option<String>,
    pub point_name: Option<String>,
    pub point_address: Option<LockerAddress>,
    pub last_webhook_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Fulfillment {
    pub id: Uuid,
    pub order_id: Option<String>,
    pub metadata: FulfillmentMetadata,
    pub created_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Fulfillment {
    pub fn new(order_id: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            metadata: FulfillmentMetadata::default(),
            created_at: Utc::now(),
            cancelled_at: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentLabel {
    pub tracking_number: String,
    pub tracking_url: String,
    pub label_url: String,
}

/// What a successful shipment creation hands back for storage on the
/// fulfillment record.
#[derive(Debug, Clone, Serialize)]
pub struct CreateFulfillmentResult {
    pub data: FulfillmentMetadata,
    pub labels: Vec<ShipmentLabel>,
}
