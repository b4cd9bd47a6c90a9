//! Driver records from the `drivers` endpoint.

use serde::{Deserialize, Serialize};

/// A single driver record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRecord {
    /// Driver identifier.
    pub driver_id: String,

    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,

    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
}

impl DriverRecord {
    /// Returns "first last", skipping absent parts.
    pub fn full_name(&self) -> Option<String> {
        match (self.first_name.as_deref(), self.last_name.as_deref()) {
            (Some(first), Some(last)) => Some(format!("{first} {last}")),
            (Some(one), None) | (None, Some(one)) => Some(one.to_string()),
            (None, None) => None,
        }
    }
}

/// Envelope of the `drivers` list endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct DriversResponse {
    /// The driver records.
    #[serde(default)]
    pub drivers: Vec<DriverRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_drivers_envelope() {
        let json = r#"{
            "drivers": [
                {"driverId": "D1", "firstName": "An", "lastName": "Peeters"},
                {"driverId": "D2", "firstName": "Jo"}
            ]
        }"#;

        let response: DriversResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.drivers.len(), 2);
        assert_eq!(response.drivers[0].full_name().as_deref(), Some("An Peeters"));
        assert_eq!(response.drivers[1].full_name().as_deref(), Some("Jo"));
    }

    #[test]
    fn test_full_name_absent() {
        let driver = DriverRecord {
            driver_id: "D3".to_string(),
            first_name: None,
            last_name: None,
        };
        assert!(driver.full_name().is_none());
    }
}
