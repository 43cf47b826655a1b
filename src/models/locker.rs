use serde::{Deserialize, Serialize};

use crate::shipx::types::{Point, PointAddress};

pub const STATUS_OPERATING: &str = "Operating";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LockerAddress {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub postcode: String,
    pub country: String,
}

impl From<PointAddress> for LockerAddress {
    fn from(address: PointAddress) -> Self {
        Self {
            line1: address.line1.unwrap_or_default(),
            line2: address.line2.unwrap_or_default(),
            city: address.city.unwrap_or_default(),
            postcode: address.post_code.unwrap_or_default(),
            country: address.country_code.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Normalized locker shape served to the storefront.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Locker {
    pub id: String,
    pub name: String,
    pub description: String,
    pub address: LockerAddress,
    pub location: GeoLocation,
    pub opening_hours: String,
    pub payment_available: bool,
    pub is_next: bool,
    pub recommended: bool,
    pub image_url: String,
    pub status: String,
}

impl Locker {
    pub fn is_operating(&self) -> bool {
        self.status == STATUS_OPERATING
    }
}

impl From<Point> for Locker {
    fn from(point: Point) -> Self {
        Self {
            id: point.name.clone(),
            name: point.name,
            description: point.location_description.unwrap_or_default(),
            address: point.address.map(LockerAddress::from).unwrap_or_default(),
            location: point
                .location
                .map(|location| GeoLocation {
                    latitude: location.latitude,
                    longitude: location.longitude,
                })
                .unwrap_or_default(),
            opening_hours: point.opening_hours.unwrap_or_else(|| "24/7".to_string()),
            payment_available: point.payment_available.unwrap_or(false),
            is_next: point.is_next.unwrap_or(false),
            recommended: point.recommended.unwrap_or(false),
            image_url: point.image_url.unwrap_or_default(),
            status: point.status.unwrap_or_else(|| STATUS_OPERATING.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Locker, LockerAddress};
    use crate::shipx::types::Point;

    #[test]
    fn sparse_point_normalizes_with_defaults() {
        let point: Point = serde_json::from_value(serde_json::json!({
            "name": "KRA010M"
        }))
        .unwrap();

        let locker = Locker::from(point);
        assert_eq!(locker.id, "KRA010M");
        assert_eq!(locker.opening_hours, "24/7");
        assert_eq!(locker.status, "Operating");
        assert!(locker.is_operating());
        assert_eq!(locker.address, LockerAddress::default());
    }

    #[test]
    fn full_point_maps_address_fields() {
        let point: Point = serde_json::from_value(serde_json::json!({
            "name": "WAW123A",
            "location_description": "Przy stacji benzynowej",
            "address": {
                "line1": "Marszałkowska 1",
                "city": "Warszawa",
                "post_code": "00-624",
                "country_code": "PL"
            },
            "location": { "latitude": 52.2297, "longitude": 21.0122 },
            "opening_hours": "06:00-22:00",
            "payment_available": true,
            "status": "NonOperating"
        }))
        .unwrap();

        let locker = Locker::from(point);
        assert_eq!(locker.address.postcode, "00-624");
        assert_eq!(locker.address.line2, "");
        assert_eq!(locker.location.latitude, 52.2297);
        assert!(locker.payment_available);
        assert!(!locker.is_operating());
    }
}
