//! Read-only domain views.
//!
//! A view holds an identifier and a handle to the client; every field
//! access re-resolves the backing record through the cached client and
//! projects one attribute. Nothing is ever written back to the server
//! from this layer.

use mindlink_core::{DriverRecord, Geocoded, Lookup, MindError, VehicleRecord, VehicleState};

use crate::client::MindClient;

// ============================================================================
// Vehicle
// ============================================================================

/// Read-only view of a vehicle.
#[derive(Debug, Clone)]
pub struct Vehicle {
    id: String,
    client: MindClient,
}

impl Vehicle {
    pub(crate) fn new(id: String, client: MindClient) -> Self {
        Self { id, client }
    }

    /// The vehicle identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The backing record, fetched through the cache.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn record(&self) -> Result<Lookup<VehicleRecord>, MindError> {
        self.client.vehicle(&self.id).await
    }

    /// License plate.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn license_plate(&self) -> Result<Lookup<String>, MindError> {
        Ok(self
            .record()
            .await?
            .and_then(|r| Lookup::from_option(r.registration_number)))
    }

    /// Odometer reading in kilometers.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn mileage(&self) -> Result<Lookup<f64>, MindError> {
        Ok(self.record().await?.and_then(|r| Lookup::from_option(r.odometer)))
    }

    /// Fuel level percentage.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn fuel_level(&self) -> Result<Lookup<f64>, MindError> {
        Ok(self
            .record()
            .await?
            .and_then(|r| Lookup::from_option(r.fuel_level)))
    }

    /// Remaining range on the current tank, in kilometers.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn mileage_left(&self) -> Result<Lookup<f64>, MindError> {
        Ok(self
            .record()
            .await?
            .and_then(|r| Lookup::from_option(r.range_fuel)))
    }

    /// Last reported latitude.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn lat(&self) -> Result<Lookup<f64>, MindError> {
        Ok(self.record().await?.and_then(|r| Lookup::from_option(r.lat)))
    }

    /// Last reported longitude.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn lon(&self) -> Result<Lookup<f64>, MindError> {
        Ok(self.record().await?.and_then(|r| Lookup::from_option(r.lon)))
    }

    /// Last reported position.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn position(&self) -> Result<Lookup<(f64, f64)>, MindError> {
        Ok(self
            .record()
            .await?
            .and_then(|r| Lookup::from_option(r.position())))
    }

    /// State scores, folded into a name→score mapping.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn state(&self) -> Result<Lookup<VehicleState>, MindError> {
        self.client.vehicle_state(&self.id).await
    }

    /// One state score by metric name.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn score(&self, score_type: &str) -> Result<Lookup<f64>, MindError> {
        Ok(self
            .state()
            .await?
            .and_then(|s| Lookup::from_option(s.score(score_type))))
    }

    /// Remaining electric range.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn range_electric(&self) -> Result<Lookup<f64>, MindError> {
        self.score("range_electric").await
    }

    /// Battery charge level.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn charge_level(&self) -> Result<Lookup<f64>, MindError> {
        self.score("charge_level").await
    }

    /// Reverse-geocoded address of the last reported position. Resolves
    /// the coordinates first, then the geocode lookup (permanently
    /// cached).
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn address(&self) -> Result<Lookup<Geocoded>, MindError> {
        match self.position().await? {
            Lookup::Found((lat, lon)) => self.client.geocode(lat, lon).await,
            Lookup::Missing => Ok(Lookup::Missing),
            Lookup::Unavailable => Ok(Lookup::Unavailable),
        }
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Read-only view of a driver.
#[derive(Debug, Clone)]
pub struct Driver {
    id: String,
    client: MindClient,
}

impl Driver {
    pub(crate) fn new(id: String, client: MindClient) -> Self {
        Self { id, client }
    }

    /// The driver identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The backing record, fetched through the cache.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn record(&self) -> Result<Lookup<DriverRecord>, MindError> {
        self.client.driver(&self.id).await
    }

    /// First name.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn first_name(&self) -> Result<Lookup<String>, MindError> {
        Ok(self
            .record()
            .await?
            .and_then(|r| Lookup::from_option(r.first_name)))
    }

    /// Last name.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn last_name(&self) -> Result<Lookup<String>, MindError> {
        Ok(self
            .record()
            .await?
            .and_then(|r| Lookup::from_option(r.last_name)))
    }

    /// Full display name.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn full_name(&self) -> Result<Lookup<String>, MindError> {
        Ok(self
            .record()
            .await?
            .and_then(|r| Lookup::from_option(r.full_name())))
    }
}
