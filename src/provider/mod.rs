//! Fulfillment provider contract and its InPost implementation.
//!
//! The trait covers the capability set a store platform expects from a
//! shipping provider: option listing, applicability, selection
//! validation, price calculation, shipment create/cancel, document
//! retrieval, and tracking. One implementing type per courier.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::AppError;
use crate::models::fulfillment::{
    CreateFulfillmentResult, Fulfillment, FulfillmentMetadata, ShipmentLabel,
};
use crate::models::locker::{LockerAddress, STATUS_OPERATING};
use crate::models::order::{LineItem, Order, ShippingAddress};
use crate::shipx::types::{Parcel, ParcelWeight, Receiver, ShipmentRequest, TrackingInfo};
use crate::shipx::ShipxClient;

pub const SERVICE_LOCKER_STANDARD: &str = "inpost_locker_standard";

/// Flat rate in grosz (12.90 PLN), not tax inclusive.
pub const BASE_PRICE: i64 = 1290;
/// Added above [`HEAVY_PARCEL_THRESHOLD_G`] (5 PLN).
pub const HEAVY_PARCEL_SURCHARGE: i64 = 500;
pub const HEAVY_PARCEL_THRESHOLD_G: u64 = 5000;

const DEFAULT_ITEM_WEIGHT_G: u32 = 500;
const MIN_PARCEL_WEIGHT_KG: f64 = 0.1;

#[derive(Debug, Clone, Serialize)]
pub struct FulfillmentOption {
    pub id: &'static str,
    pub name: &'static str,
    #[serde(rename = "type")]
    pub option_type: &'static str,
    pub description: &'static str,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct CalculatedPrice {
    pub calculated_amount: i64,
    pub is_calculated_price_tax_inclusive: bool,
}

/// Checkout-provided data accompanying a locker shipping method.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SelectionData {
    pub target_point: Option<String>,
}

/// Result of a successful locker validation, persisted alongside the
/// order so the shopper's pick survives to fulfillment time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidatedSelection {
    pub target_point: String,
    pub point_name: String,
    pub point_address: LockerAddress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentType {
    Label,
    Invoice,
}

#[allow(async_fn_in_trait)]
pub trait FulfillmentProvider {
    fn identifier(&self) -> &'static str;

    fn list_options(&self) -> Vec<FulfillmentOption>;

    fn is_applicable(&self, shipping_address: Option<&ShippingAddress>) -> bool;

    fn calculate_price(&self, items: &[LineItem]) -> CalculatedPrice;

    async fn validate_selection(&self, data: &SelectionData)
        -> Result<ValidatedSelection, AppError>;

    async fn create_fulfillment(
        &self,
        data: &SelectionData,
        items: &[LineItem],
        order: &Order,
        fulfillment: &Fulfillment,
    ) -> Result<CreateFulfillmentResult, AppError>;

    async fn cancel_fulfillment(&self, fulfillment: &Fulfillment)
        -> Result<DateTime<Utc>, AppError>;

    async fn retrieve_documents(
        &self,
        metadata: &FulfillmentMetadata,
        document: DocumentType,
    ) -> Result<Option<Vec<u8>>, AppError>;

    async fn get_tracking_info(&self, tracking_number: &str) -> Result<TrackingInfo, AppError>;
}

#[derive(Debug, Clone)]
pub struct InpostProvider {
    shipx: ShipxClient,
}

impl InpostProvider {
    pub const IDENTIFIER: &'static str = "inpost-fulfillment";

    pub fn new(shipx: ShipxClient) -> Self {
        Self { shipx }
    }
}

impl FulfillmentProvider for InpostProvider {
    fn identifier(&self) -> &'static str {
        Self::IDENTIFIER
    }

    fn list_options(&self) -> Vec<FulfillmentOption> {
        vec![FulfillmentOption {
            id: SERVICE_LOCKER_STANDARD,
            name: "Paczkomaty InPost",
            option_type: SERVICE_LOCKER_STANDARD,
            description: "Dostawa do wybranego Paczkomatu InPost",
        }]
    }

    // Locker delivery is offered for Poland only.
    fn is_applicable(&self, shipping_address: Option<&ShippingAddress>) -> bool {
        shipping_address
            .and_then(|address| address.country_code.as_deref())
            .is_some_and(|country_code| country_code.eq_ignore_ascii_case("pl"))
    }

    fn calculate_price(&self, items: &[LineItem]) -> CalculatedPrice {
        CalculatedPrice {
            calculated_amount: price_for_weight(cart_weight_grams(items)),
            is_calculated_price_tax_inclusive: false,
        }
    }

    async fn validate_selection(
        &self,
        data: &SelectionData,
    ) -> Result<ValidatedSelection, AppError> {
        let target_point = data.target_point.as_deref().ok_or_else(|| {
            AppError::InvalidData("target_point is required for InPost locker delivery".to_string())
        })?;

        let point = self.shipx.get_point(target_point).await;

        match point {
            Some(point) if point.status.as_deref() == Some(STATUS_OPERATING) => {
                Ok(ValidatedSelection {
                    target_point: target_point.to_string(),
                    point_name: point.name.clone(),
                    point_address: point.address.map(LockerAddress::from).unwrap_or_default(),
                })
            }
            Some(point) => {
                warn!(
                    point = target_point,
                    status = point.status.as_deref().unwrap_or("unknown"),
                    "selected locker is not operating"
                );
                Err(AppError::InvalidData(
                    "selected InPost locker is not available".to_string(),
                ))
            }
            None => Err(AppError::InvalidData(
                "selected InPost locker is not available".to_string(),
            )),
        }
    }

    async fn create_fulfillment(
        &self,
        data: &SelectionData,
        items: &[LineItem],
        order: &Order,
        fulfillment: &Fulfillment,
    ) -> Result<CreateFulfillmentResult, AppError> {
        // Caller input is checked before anything touches the network.
        let shipping_address = order.shipping_address.as_ref().ok_or_else(|| {
            AppError::InvalidData("order must have a shipping address".to_string())
        })?;

        let target_point = data.target_point.clone().ok_or_else(|| {
            AppError::InvalidData("target_point is required for InPost fulfillment".to_string())
        })?;

        let mut custom_attributes = BTreeMap::new();
        custom_attributes.insert(
            "order_id".to_string(),
            order.id.clone().unwrap_or_default(),
        );
        custom_attributes.insert("fulfillment_id".to_string(), fulfillment.id.to_string());

        let request = ShipmentRequest {
            receiver: Receiver {
                first_name: shipping_address.first_name.clone().unwrap_or_default(),
                last_name: shipping_address.last_name.clone().unwrap_or_default(),
                phone: shipping_address.phone.clone().unwrap_or_default(),
                email: order.email.clone().unwrap_or_default(),
            },
            parcels: vec![Parcel {
                template: Some("small".to_string()),
                weight: Some(ParcelWeight {
                    value: parcel_weight_kg(items),
                    unit: "kg".to_string(),
                }),
                reference: Some(format!("ITEMS-{}", items.len())),
            }],
            service: SERVICE_LOCKER_STANDARD.to_string(),
            reference: Some(format!("ORDER-{}", order.display_id.unwrap_or_default())),
            target_point: Some(target_point.clone()),
            custom_attributes,
        };

        let shipment = self.shipx.create_shipment(&request).await?;

        info!(shipment_id = %shipment.id, target_point, "created InPost shipment");

        let labels = match (&shipment.tracking_number, &shipment.label_url) {
            (Some(tracking_number), Some(label_url)) => vec![ShipmentLabel {
                tracking_number: tracking_number.clone(),
                tracking_url: shipment.tracking_url.clone().unwrap_or_default(),
                label_url: label_url.clone(),
            }],
            _ => Vec::new(),
        };

        Ok(CreateFulfillmentResult {
            data: FulfillmentMetadata {
                inpost_shipment_id: Some(shipment.id),
                inpost_status: shipment.status,
                tracking_number: shipment.tracking_number,
                tracking_url: shipment.tracking_url,
                target_point: Some(target_point),
                service: Some(SERVICE_LOCKER_STANDARD.to_string()),
                label_url: shipment.label_url,
                ..FulfillmentMetadata::default()
            },
            labels,
        })
    }

    async fn cancel_fulfillment(
        &self,
        fulfillment: &Fulfillment,
    ) -> Result<DateTime<Utc>, AppError> {
        let shipment_id = fulfillment
            .metadata
            .inpost_shipment_id
            .as_deref()
            .ok_or_else(|| AppError::InvalidData("InPost shipment ID not found".to_string()))?;

        self.shipx.cancel_shipment(shipment_id).await?;

        info!(shipment_id, "cancelled InPost shipment");

        Ok(Utc::now())
    }

    async fn retrieve_documents(
        &self,
        metadata: &FulfillmentMetadata,
        document: DocumentType,
    ) -> Result<Option<Vec<u8>>, AppError> {
        let shipment_id = metadata
            .inpost_shipment_id
            .as_deref()
            .ok_or_else(|| AppError::InvalidData("InPost shipment ID not found".to_string()))?;

        match document {
            DocumentType::Label => self.shipx.get_label(shipment_id).await.map(Some),
            // InPost provides no invoice documents over the API.
            DocumentType::Invoice => Ok(None),
        }
    }

    async fn get_tracking_info(&self, tracking_number: &str) -> Result<TrackingInfo, AppError> {
        self.shipx.get_tracking(tracking_number).await
    }
}

/// Total cart weight for pricing. Items without a known weight count
/// as zero here; the parcel builder below assumes 500 g instead.
pub fn cart_weight_grams(items: &[LineItem]) -> u64 {
    items
        .iter()
        .map(|item| u64::from(item.weight.unwrap_or(0)) * u64::from(item.quantity))
        .sum()
}

pub fn price_for_weight(total_grams: u64) -> i64 {
    if total_grams > HEAVY_PARCEL_THRESHOLD_G {
        BASE_PRICE + HEAVY_PARCEL_SURCHARGE
    } else {
        BASE_PRICE
    }
}

/// Parcel weight sent to the courier, in kilograms with a 0.1 kg floor.
fn parcel_weight_kg(items: &[LineItem]) -> f64 {
    let total_grams: u64 = items
        .iter()
        .map(|item| u64::from(item.weight.unwrap_or(DEFAULT_ITEM_WEIGHT_G)) * u64::from(item.quantity))
        .sum();

    (total_grams as f64 / 1000.0).max(MIN_PARCEL_WEIGHT_KG)
}

#[cfg(test)]
mod tests {
    use super::{
        parcel_weight_kg, DocumentType, FulfillmentProvider, InpostProvider, SelectionData,
        BASE_PRICE, HEAVY_PARCEL_SURCHARGE,
    };
    use crate::config::{Config, Environment};
    use crate::error::AppError;
    use crate::models::fulfillment::{Fulfillment, FulfillmentMetadata};
    use crate::models::order::{LineItem, Order, ShippingAddress};
    use crate::shipx::ShipxClient;

    fn item(weight: Option<u32>, quantity: u32) -> LineItem {
        LineItem {
            title: None,
            quantity,
            weight,
        }
    }

    fn address(country_code: &str) -> ShippingAddress {
        ShippingAddress {
            country_code: Some(country_code.to_string()),
            ..ShippingAddress::default()
        }
    }

    // Points at a closed local port: any attempted request fails as
    // UnexpectedState, so InvalidData results prove no call was made.
    fn offline_provider() -> InpostProvider {
        let config = Config {
            http_port: 0,
            log_level: "info".to_string(),
            api_token: "test-token".to_string(),
            organization_id: "42".to_string(),
            api_url: "http://127.0.0.1:9".to_string(),
            environment: Environment::Sandbox,
            webhook_url: None,
        };
        InpostProvider::new(ShipxClient::new(&config).unwrap())
    }

    #[test]
    fn light_cart_gets_base_price() {
        let provider = offline_provider();
        let price = provider.calculate_price(&[item(Some(2000), 2), item(Some(1000), 1)]);

        assert_eq!(price.calculated_amount, BASE_PRICE);
        assert!(!price.is_calculated_price_tax_inclusive);
    }

    #[test]
    fn heavy_cart_gets_surcharge() {
        let provider = offline_provider();
        let price = provider.calculate_price(&[item(Some(3000), 2)]);

        assert_eq!(price.calculated_amount, BASE_PRICE + HEAVY_PARCEL_SURCHARGE);
    }

    #[test]
    fn empty_cart_gets_base_price() {
        let provider = offline_provider();
        assert_eq!(provider.calculate_price(&[]).calculated_amount, BASE_PRICE);
    }

    #[test]
    fn threshold_weight_is_not_heavy() {
        let provider = offline_provider();
        let price = provider.calculate_price(&[item(Some(5000), 1)]);

        assert_eq!(price.calculated_amount, BASE_PRICE);
    }

    #[test]
    fn unknown_weights_price_as_zero() {
        let provider = offline_provider();
        let price = provider.calculate_price(&[item(None, 20)]);

        assert_eq!(price.calculated_amount, BASE_PRICE);
    }

    #[test]
    fn parcel_weight_defaults_unknown_items_to_half_kilo() {
        let kg = parcel_weight_kg(&[item(None, 2), item(Some(250), 1)]);
        assert!((kg - 1.25).abs() < 1e-9);
    }

    #[test]
    fn parcel_weight_has_a_floor() {
        assert!((parcel_weight_kg(&[]) - 0.1).abs() < 1e-9);
        assert!((parcel_weight_kg(&[item(Some(10), 1)]) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn applicable_only_for_poland() {
        let provider = offline_provider();

        assert!(provider.is_applicable(Some(&address("pl"))));
        assert!(provider.is_applicable(Some(&address("PL"))));
        assert!(!provider.is_applicable(Some(&address("de"))));
        assert!(!provider.is_applicable(None));
    }

    #[tokio::test]
    async fn validate_selection_requires_target_point() {
        let provider = offline_provider();
        let err = provider
            .validate_selection(&SelectionData { target_point: None })
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidData(_)));
    }

    #[tokio::test]
    async fn create_without_shipping_address_fails_before_any_request() {
        let provider = offline_provider();
        let order = Order::default();
        let fulfillment = Fulfillment::new(None);

        let err = provider
            .create_fulfillment(
                &SelectionData {
                    target_point: Some("KRA010M".to_string()),
                },
                &[item(Some(500), 1)],
                &order,
                &fulfillment,
            )
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidData(_)));
    }

    #[tokio::test]
    async fn create_without_target_point_fails_before_any_request() {
        let provider = offline_provider();
        let order = Order {
            shipping_address: Some(address("pl")),
            ..Order::default()
        };
        let fulfillment = Fulfillment::new(None);

        let err = provider
            .create_fulfillment(&SelectionData::default(), &[], &order, &fulfillment)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidData(_)));
    }

    #[tokio::test]
    async fn cancel_without_shipment_id_is_invalid_data() {
        let provider = offline_provider();
        let fulfillment = Fulfillment::new(None);

        let err = provider.cancel_fulfillment(&fulfillment).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidData(_)));
    }

    #[tokio::test]
    async fn invoice_documents_are_not_provided() {
        let provider = offline_provider();
        let metadata = FulfillmentMetadata {
            inpost_shipment_id: Some("shp_1".to_string()),
            ..FulfillmentMetadata::default()
        };

        let documents = provider
            .retrieve_documents(&metadata, DocumentType::Invoice)
            .await
            .unwrap();
        assert!(documents.is_none());
    }
}
