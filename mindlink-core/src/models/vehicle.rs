//! Vehicle records from the `vehicles` endpoint.

use serde::{Deserialize, Serialize};

/// A single vehicle record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleRecord {
    /// Vehicle identifier.
    pub vehicle_id: String,

    /// License plate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,

    /// Odometer reading in kilometers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub odometer: Option<f64>,

    /// Fuel level percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fuel_level: Option<f64>,

    /// Remaining range on the current tank, in kilometers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_fuel: Option<f64>,

    /// Last reported latitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lat: Option<f64>,

    /// Last reported longitude.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lon: Option<f64>,
}

impl VehicleRecord {
    /// Returns the last reported position when both coordinates are known.
    pub fn position(&self) -> Option<(f64, f64)> {
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some((lat, lon)),
            _ => None,
        }
    }
}

/// Envelope of the `vehicles` list endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehiclesResponse {
    /// The vehicle records.
    #[serde(default)]
    pub vehicle_jsons: Vec<VehicleRecord>,
}

// ============================================================================
// Tests
// ============================================================================
