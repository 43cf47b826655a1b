//! Minimal client for the store platform's admin API, used by the
//! provisioning binary to create the records the provider needs at
//! checkout.

use std::time::Duration;

use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error::AppError;

#[derive(Debug, Clone)]
pub struct PlatformClient {
    base_url: String,
    http: Client,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Region {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShippingProfile {
    pub id: String,
    #[serde(rename = "type")]
    pub profile_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceZone {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct FulfillmentSet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub service_zones: Vec<ServiceZone>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ShippingOption {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateRegion {
    pub name: String,
    pub currency_code: String,
    pub countries: Vec<String>,
    pub payment_providers: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateTaxRegion {
    pub country_code: String,
    pub provider_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GeoZone {
    #[serde(rename = "type")]
    pub zone_type: String,
    pub country_code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateServiceZone {
    pub name: String,
    pub geo_zones: Vec<GeoZone>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateFulfillmentSet {
    pub name: String,
    #[serde(rename = "type")]
    pub set_type: String,
    pub service_zones: Vec<CreateServiceZone>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingOptionType {
    pub label: String,
    pub description: String,
    pub code: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ShippingOptionRule {
    pub attribute: String,
    pub value: String,
    pub operator: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateShippingOption {
    pub name: String,
    pub price_type: String,
    pub provider_id: String,
    pub service_zone_id: String,
    pub shipping_profile_id: String,
    #[serde(rename = "type")]
    pub option_type: ShippingOptionType,
    pub rules: Vec<ShippingOptionRule>,
}

#[derive(Deserialize)]
struct RegionsEnvelope {
    regions: Vec<Region>,
}

#[derive(Deserialize)]
struct RegionEnvelope {
    region: Region,
}

#[derive(Deserialize)]
struct ShippingProfilesEnvelope {
    shipping_profiles: Vec<ShippingProfile>,
}

#[derive(Deserialize)]
struct FulfillmentSetsEnvelope {
    fulfillment_sets: Vec<FulfillmentSet>,
}

#[derive(Deserialize)]
struct FulfillmentSetEnvelope {
    fulfillment_set: FulfillmentSet,
}

#[derive(Deserialize)]
struct ShippingOptionsEnvelope {
    shipping_options: Vec<ShippingOption>,
}

#[derive(Deserialize)]
struct ShippingOptionEnvelope {
    shipping_option: ShippingOption,
}

impl PlatformClient {
    pub fn new(base_url: &str, admin_token: &str) -> Result<Self, AppError> {
        let mut default_headers = header::HeaderMap::new();

        let mut authorization = header::HeaderValue::from_str(&format!("Bearer {admin_token}"))
            .map_err(|err| AppError::Internal(format!("invalid PLATFORM_ADMIN_TOKEN: {err}")))?;
        authorization.set_sensitive(true);
        default_headers.insert(header::AUTHORIZATION, authorization);

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| AppError::Internal(format!("failed to build platform client: {err}")))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            http,
        })
    }

    pub async fn list_regions(&self) -> Result<Vec<Region>, AppError> {
        self.get_json::<RegionsEnvelope>("/admin/regions")
            .await
            .map(|envelope| envelope.regions)
    }

    pub async fn create_region(&self, request: &CreateRegion) -> Result<Region, AppError> {
        self.post_json::<_, RegionEnvelope>("/admin/regions", request)
            .await
            .map(|envelope| envelope.region)
    }

    pub async fn create_tax_region(&self, request: &CreateTaxRegion) -> Result<(), AppError> {
        self.post_json::<_, serde_json::Value>("/admin/tax-regions", request)
            .await
            .map(|_| ())
    }

    pub async fn list_default_shipping_profiles(&self) -> Result<Vec<ShippingProfile>, AppError> {
        self.get_json::<ShippingProfilesEnvelope>("/admin/shipping-profiles?type=default")
            .await
            .map(|envelope| envelope.shipping_profiles)
    }

    pub async fn list_fulfillment_sets(&self) -> Result<Vec<FulfillmentSet>, AppError> {
        self.get_json::<FulfillmentSetsEnvelope>("/admin/fulfillment-sets")
            .await
            .map(|envelope| envelope.fulfillment_sets)
    }

    pub async fn create_fulfillment_set(
        &self,
        request: &CreateFulfillmentSet,
    ) -> Result<FulfillmentSet, AppError> {
        self.post_json::<_, FulfillmentSetEnvelope>("/admin/fulfillment-sets", request)
            .await
            .map(|envelope| envelope.fulfillment_set)
    }

    pub async fn list_shipping_options(&self) -> Result<Vec<ShippingOption>, AppError> {
        self.get_json::<ShippingOptionsEnvelope>("/admin/shipping-options")
            .await
            .map(|envelope| envelope.shipping_options)
    }

    pub async fn create_shipping_option(
        &self,
        request: &CreateShippingOption,
    ) -> Result<ShippingOption, AppError> {
        self.post_json::<_, ShippingOptionEnvelope>("/admin/shipping-options", request)
            .await
            .map(|envelope| envelope.shipping_option)
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, AppError> {
        let url = format!("{}{path}", self.base_url);

        let response = self.http.get(&url).send().await.map_err(|err| {
            error!(path, error = %err, "platform request failed");
            AppError::UnexpectedState(format!("platform request to {path} failed"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(path, %status, body, "platform request returned non-success status");
            return Err(AppError::UnexpectedState(format!(
                "platform request to {path} failed with status {status}"
            )));
        }

        response.json::<T>().await.map_err(|err| {
            error!(path, error = %err, "failed to decode platform response");
            AppError::UnexpectedState(format!("platform request to {path} failed"))
        })
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, AppError> {
        let url = format!("{}{path}", self.base_url);

        let response = self.http.post(&url).json(body).send().await.map_err(|err| {
            error!(path, error = %err, "platform request failed");
            AppError::UnexpectedState(format!("platform request to {path} failed"))
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(path, %status, body, "platform request returned non-success status");
            return Err(AppError::UnexpectedState(format!(
                "platform request to {path} failed with status {status}"
            )));
        }

        response.json::<T>().await.map_err(|err| {
            error!(path, error = %err, "failed to decode platform response");
            AppError::UnexpectedState(format!("platform request to {path} failed"))
        })
    }
}
