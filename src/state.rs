use dashmap::DashMap;
use uuid::Uuid;

use crate::models::fulfillment::Fulfillment;
use crate::observability::metrics::Metrics;
use crate::provider::InpostProvider;
use crate::shipx::ShipxClient;

/// Shared state for the HTTP layer. Fulfillment records live in
/// memory; the host platform owns durable order storage.
pub struct AppState {
    pub shipx: ShipxClient,
    pub provider: InpostProvider,
    pub fulfillments: DashMap<Uuid, Fulfillment>,
    pub metrics: Metrics,
}

impl AppState {
    pub fn new(shipx: ShipxClient) -> Self {
        Self {
            provider: InpostProvider::new(shipx.clone()),
            shipx,
            fulfillments: DashMap::new(),
            metrics: Metrics::new(),
        }
    }
}
