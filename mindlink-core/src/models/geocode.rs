//! Reverse-geocode results from the `geocoding/reverse` endpoint.

use serde::{Deserialize, Serialize};

/// A reverse-geocoded address. Every field is optional; the backend fills
/// in what it can resolve for the coordinates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Geocoded {
    /// Full display address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub formatted_address: Option<String>,

    /// Street name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub street: Option<String>,

    /// House number.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub house_number: Option<String>,

    /// Postal code.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,

    /// City or locality.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    /// Country.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
}
