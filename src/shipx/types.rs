//! Wire types for the InPost ShipX API.
//!
//! These mirror the JSON shapes ShipX returns; the storefront-facing
//! normalized shapes live in [`crate::models::locker`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PointAddress {
    pub line1: Option<String>,
    pub line2: Option<String>,
    pub city: Option<String>,
    pub post_code: Option<String>,
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct PointLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// A single pickup point as ShipX reports it.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Point {
    pub name: String,
    pub location_description: Option<String>,
    pub address: Option<PointAddress>,
    pub location: Option<PointLocation>,
    pub opening_hours: Option<String>,
    pub payment_available: Option<bool>,
    pub status: Option<String>,
    pub is_next: Option<bool>,
    pub recommended: Option<bool>,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct PointsPage {
    #[serde(default)]
    pub items: Vec<Point>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Receiver {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParcelWeight {
    pub value: f64,
    pub unit: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Parcel {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<ParcelWeight>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentRequest {
    pub receiver: Receiver,
    pub parcels: Vec<Parcel>,
    pub service: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_point: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty", default)]
    pub custom_attributes: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: String,
    pub tracking_number: Option<String>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub label_url: Option<String>,
    pub tracking_url: Option<String>,
}

/// Tracking payloads are passed through as the courier reports them;
/// only the fields the gateway reads are named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackingInfo {
    pub tracking_number: Option<String>,
    pub status: Option<String>,
    #[serde(flatten)]
    pub details: serde_json::Map<String, serde_json::Value>,
}
