//! Client for the InPost ShipX API.
//!
//! One [`ShipxClient`] is constructed from [`Config`] at startup and
//! injected wherever the courier is called; nothing reads token or base
//! URL from ambient state. Point searches degrade to empty results on
//! upstream failure so a courier outage never blocks checkout browsing;
//! shipment mutations surface errors instead.

pub mod types;

use std::time::Duration;

use reqwest::{header, Client};
use tracing::error;

use crate::config::Config;
use crate::error::AppError;
use crate::shipx::types::{Point, PointsPage, Shipment, ShipmentRequest, TrackingInfo};

pub const DEFAULT_RADIUS_M: u32 = 5000;
pub const DEFAULT_LIMIT: u32 = 20;

/// Search filter for the points directory. Coordinates, city, and
/// postcode may be combined; the parcel-locker constraint is always
/// applied.
#[derive(Debug, Clone, Default)]
pub struct PointFilter {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub radius: Option<u32>,
    pub city: Option<String>,
    pub postcode: Option<String>,
    pub country_code: Option<String>,
    pub limit: Option<u32>,
}

impl PointFilter {
    pub fn near(latitude: f64, longitude: f64, radius: Option<u32>) -> Self {
        Self {
            latitude: Some(latitude),
            longitude: Some(longitude),
            radius,
            ..Self::default()
        }
    }

    pub fn in_city(city: impl Into<String>) -> Self {
        Self {
            city: Some(city.into()),
            ..Self::default()
        }
    }

    fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();

        if let (Some(latitude), Some(longitude)) = (self.latitude, self.longitude) {
            query.push(("latitude", latitude.to_string()));
            query.push(("longitude", longitude.to_string()));
            query.push(("radius", self.radius.unwrap_or(DEFAULT_RADIUS_M).to_string()));
        }

        if let Some(city) = &self.city {
            query.push(("city", city.clone()));
        }

        if let Some(postcode) = &self.postcode {
            query.push(("postcode", postcode.clone()));
        }

        if let Some(country_code) = &self.country_code {
            query.push(("country_code", country_code.clone()));
        }

        query.push(("limit", self.limit.unwrap_or(DEFAULT_LIMIT).to_string()));

        // Only parcel lockers are usable delivery targets.
        query.push(("functions", "parcel_locker".to_string()));
        query.push(("type", "parcel_locker".to_string()));

        query
    }
}

#[derive(Debug, Clone)]
pub struct ShipxClient {
    base_url: String,
    organization_id: String,
    http: Client,
}

impl ShipxClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut default_headers = header::HeaderMap::new();

        let mut authorization =
            header::HeaderValue::from_str(&format!("Bearer {}", config.api_token))
                .map_err(|err| AppError::Internal(format!("invalid INPOST_API_TOKEN: {err}")))?;
        authorization.set_sensitive(true);
        default_headers.insert(header::AUTHORIZATION, authorization);
        default_headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        let http = Client::builder()
            .default_headers(default_headers)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|err| AppError::Internal(format!("failed to build shipx client: {err}")))?;

        Ok(Self {
            base_url: config.api_url.trim_end_matches('/').to_string(),
            organization_id: config.organization_id.clone(),
            http,
        })
    }

    /// Fuzzy point search. Failures are logged and collapse to "no
    /// results" by design.
    pub async fn find_points(&self, filter: &PointFilter) -> Vec<Point> {
        let url = format!("{}/v1/points", self.base_url);

        let response = match self.http.get(&url).query(&filter.to_query()).send().await {
            Ok(response) => response,
            Err(err) => {
                error!(error = %err, "point search request failed");
                return Vec::new();
            }
        };

        if !response.status().is_success() {
            error!(status = %response.status(), "point search returned non-success status");
            return Vec::new();
        }

        match response.json::<PointsPage>().await {
            Ok(page) => page.items,
            Err(err) => {
                error!(error = %err, "failed to decode point search response");
                Vec::new()
            }
        }
    }

    /// Exact lookup by point name, used to validate a chosen locker.
    pub async fn get_point(&self, name: &str) -> Option<Point> {
        let url = format!("{}/v1/points/{name}", self.base_url);

        match self.http.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                match response.json::<Point>().await {
                    Ok(point) => Some(point),
                    Err(err) => {
                        error!(point = name, error = %err, "failed to decode point details");
                        None
                    }
                }
            }
            Ok(response) => {
                error!(point = name, status = %response.status(), "point lookup returned non-success status");
                None
            }
            Err(err) => {
                error!(point = name, error = %err, "point lookup request failed");
                None
            }
        }
    }

    pub async fn create_shipment(&self, request: &ShipmentRequest) -> Result<Shipment, AppError> {
        let url = format!(
            "{}/v1/organizations/{}/shipments",
            self.base_url, self.organization_id
        );

        let response = self
            .http
            .post(&url)
            .json(request)
            .send()
            .await
            .map_err(|err| {
                error!(error = %err, "shipment creation request failed");
                AppError::UnexpectedState("failed to create InPost shipment".to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(%status, body, "shipment creation returned non-success status");
            return Err(AppError::UnexpectedState(
                "failed to create InPost shipment".to_string(),
            ));
        }

        response.json::<Shipment>().await.map_err(|err| {
            error!(error = %err, "failed to decode shipment response");
            AppError::UnexpectedState("failed to create InPost shipment".to_string())
        })
    }

    pub async fn cancel_shipment(&self, shipment_id: &str) -> Result<(), AppError> {
        let url = format!("{}/v1/shipments/{shipment_id}", self.base_url);

        let response = self.http.delete(&url).send().await.map_err(|err| {
            error!(shipment_id, error = %err, "shipment cancel request failed");
            AppError::UnexpectedState("failed to cancel InPost shipment".to_string())
        })?;

        if !response.status().is_success() {
            error!(shipment_id, status = %response.status(), "shipment cancel returned non-success status");
            return Err(AppError::UnexpectedState(
                "failed to cancel InPost shipment".to_string(),
            ));
        }

        Ok(())
    }

    pub async fn get_label(&self, shipment_id: &str) -> Result<Vec<u8>, AppError> {
        let url = format!("{}/v1/shipments/{shipment_id}/label", self.base_url);

        let response = self.http.get(&url).send().await.map_err(|err| {
            error!(shipment_id, error = %err, "label request failed");
            AppError::UnexpectedState("failed to get InPost label".to_string())
        })?;

        if !response.status().is_success() {
            error!(shipment_id, status = %response.status(), "label request returned non-success status");
            return Err(AppError::UnexpectedState(
                "failed to get InPost label".to_string(),
            ));
        }

        response
            .bytes()
            .await
            .map(|bytes| bytes.to_vec())
            .map_err(|err| {
                error!(shipment_id, error = %err, "failed to read label body");
                AppError::UnexpectedState("failed to get InPost label".to_string())
            })
    }

    pub async fn get_tracking(&self, tracking_number: &str) -> Result<TrackingInfo, AppError> {
        let url = format!("{}/v1/shipments/tracking/{tracking_number}", self.base_url);

        let response = self.http.get(&url).send().await.map_err(|err| {
            error!(tracking_number, error = %err, "tracking request failed");
            AppError::NotFound("tracking information not found".to_string())
        })?;

        if !response.status().is_success() {
            error!(tracking_number, status = %response.status(), "tracking request returned non-success status");
            return Err(AppError::NotFound(
                "tracking information not found".to_string(),
            ));
        }

        response.json::<TrackingInfo>().await.map_err(|err| {
            error!(tracking_number, error = %err, "failed to decode tracking response");
            AppError::NotFound("tracking information not found".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::PointFilter;

    fn value_of<'q>(query: &'q [(&'static str, String)], key: &str) -> Option<&'q str> {
        query
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.as_str())
    }

    #[test]
    fn coordinate_filter_defaults_radius_and_limit() {
        let query = PointFilter::near(52.2297, 21.0122, None).to_query();

        assert_eq!(value_of(&query, "latitude"), Some("52.2297"));
        assert_eq!(value_of(&query, "longitude"), Some("21.0122"));
        assert_eq!(value_of(&query, "radius"), Some("5000"));
        assert_eq!(value_of(&query, "limit"), Some("20"));
    }

    #[test]
    fn city_filter_omits_radius() {
        let query = PointFilter::in_city("Kraków").to_query();

        assert_eq!(value_of(&query, "city"), Some("Kraków"));
        assert_eq!(value_of(&query, "radius"), None);
    }

    #[test]
    fn every_query_is_constrained_to_parcel_lockers() {
        for filter in [
            PointFilter::default(),
            PointFilter::near(50.06, 19.94, Some(2500)),
            PointFilter::in_city("Gdańsk"),
        ] {
            let query = filter.to_query();
            assert_eq!(value_of(&query, "functions"), Some("parcel_locker"));
            assert_eq!(value_of(&query, "type"), Some("parcel_locker"));
        }
    }
}
