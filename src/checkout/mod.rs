//! Delivery-selection state for checkout.
//!
//! The storefront selector pairs a shipping-method radio group with a
//! mandatory locker pick. A non-locker method commits immediately; a
//! locker method stays pending until a locker is chosen and confirmed,
//! and switching methods discards any stored pick.

use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::locker::Locker;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingMethod {
    pub id: String,
    pub name: String,
    pub provider_id: Option<String>,
}

impl ShippingMethod {
    pub fn is_locker_delivery(&self) -> bool {
        self.name.to_lowercase().contains("inpost")
            || self
                .provider_id
                .as_deref()
                .is_some_and(|provider_id| provider_id.contains("inpost"))
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum DeliverySelection {
    #[default]
    NoMethod,
    /// A non-locker method, committed on selection.
    Committed { method: ShippingMethod },
    /// A locker method waiting for a locker pick.
    PendingLocker { method: ShippingMethod },
    /// A locker was picked on the map but not yet confirmed.
    LockerChosen {
        method: ShippingMethod,
        locker: Locker,
    },
    Confirmed {
        method: ShippingMethod,
        locker: Locker,
    },
}

impl DeliverySelection {
    /// Selecting a method replaces whatever was selected before; any
    /// stored locker pick is discarded.
    pub fn select_method(self, method: ShippingMethod) -> Self {
        if method.is_locker_delivery() {
            DeliverySelection::PendingLocker { method }
        } else {
            DeliverySelection::Committed { method }
        }
    }

    pub fn choose_locker(self, locker: Locker) -> Result<Self, AppError> {
        match self {
            DeliverySelection::PendingLocker { method }
            | DeliverySelection::LockerChosen { method, .. }
            | DeliverySelection::Confirmed { method, .. } => {
                Ok(DeliverySelection::LockerChosen { method, locker })
            }
            DeliverySelection::NoMethod | DeliverySelection::Committed { .. } => {
                Err(AppError::InvalidData(
                    "no locker delivery method selected".to_string(),
                ))
            }
        }
    }

    /// Continuation to payment goes through here.
    pub fn confirm(self) -> Result<Self, AppError> {
        match self {
            DeliverySelection::NoMethod => Err(AppError::InvalidData(
                "select a delivery method before continuing".to_string(),
            )),
            DeliverySelection::PendingLocker { .. } => Err(AppError::InvalidData(
                "select an InPost locker before continuing".to_string(),
            )),
            DeliverySelection::LockerChosen { method, locker } => {
                Ok(DeliverySelection::Confirmed { method, locker })
            }
            committed => Ok(committed),
        }
    }

    pub fn chosen_locker(&self) -> Option<&Locker> {
        match self {
            DeliverySelection::LockerChosen { locker, .. }
            | DeliverySelection::Confirmed { locker, .. } => Some(locker),
            _ => None,
        }
    }

    pub fn can_proceed(&self) -> bool {
        matches!(
            self,
            DeliverySelection::Committed { .. } | DeliverySelection::Confirmed { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{DeliverySelection, ShippingMethod};
    use crate::models::locker::Locker;
    use crate::shipx::types::Point;

    fn locker_method() -> ShippingMethod {
        ShippingMethod {
            id: "so_01".to_string(),
            name: "Paczkomaty InPost".to_string(),
            provider_id: Some("inpost-fulfillment".to_string()),
        }
    }

    fn courier_method() -> ShippingMethod {
        ShippingMethod {
            id: "so_02".to_string(),
            name: "Kurier DPD".to_string(),
            provider_id: Some("manual".to_string()),
        }
    }

    fn locker(name: &str) -> Locker {
        Locker::from(Point {
            name: name.to_string(),
            ..Point::default()
        })
    }

    #[test]
    fn non_locker_method_commits_immediately() {
        let selection = DeliverySelection::default().select_method(courier_method());

        assert!(selection.can_proceed());
        assert!(selection.confirm().unwrap().can_proceed());
    }

    #[test]
    fn locker_method_is_pending_until_confirmed() {
        let selection = DeliverySelection::default().select_method(locker_method());

        assert!(!selection.can_proceed());
        assert!(selection.clone().confirm().is_err());

        let selection = selection.choose_locker(locker("KRA010M")).unwrap();
        assert!(!selection.can_proceed());

        let selection = selection.confirm().unwrap();
        assert!(selection.can_proceed());
        assert_eq!(selection.chosen_locker().unwrap().name, "KRA010M");
    }

    #[test]
    fn switching_methods_clears_the_locker() {
        let selection = DeliverySelection::default()
            .select_method(locker_method())
            .choose_locker(locker("KRA010M"))
            .unwrap()
            .confirm()
            .unwrap()
            .select_method(courier_method());

        assert!(selection.chosen_locker().is_none());
        assert!(selection.can_proceed());
    }

    #[test]
    fn reselecting_a_locker_method_resets_to_pending() {
        let selection = DeliverySelection::default()
            .select_method(locker_method())
            .choose_locker(locker("KRA010M"))
            .unwrap()
            .select_method(locker_method());

        assert!(matches!(selection, DeliverySelection::PendingLocker { .. }));
        assert!(!selection.can_proceed());
    }

    #[test]
    fn choosing_a_locker_without_a_locker_method_is_rejected() {
        let err = DeliverySelection::default()
            .select_method(courier_method())
            .choose_locker(locker("KRA010M"))
            .unwrap_err();

        assert!(matches!(err, crate::error::AppError::InvalidData(_)));
    }

    #[test]
    fn repicking_a_locker_replaces_the_previous_one() {
        let selection = DeliverySelection::default()
            .select_method(locker_method())
            .choose_locker(locker("KRA010M"))
            .unwrap()
            .choose_locker(locker("WAW123A"))
            .unwrap()
            .confirm()
            .unwrap();

        assert_eq!(selection.chosen_locker().unwrap().name, "WAW123A");
    }
}
