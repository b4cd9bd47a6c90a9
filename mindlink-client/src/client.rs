//! Cached Mind API client.
//!
//! GET results are cached per key; a token expiry (pre-flight or HTTP 401)
//! triggers exactly one transparent re-authentication and retry before the
//! expiry surfaces to the caller. Non-2xx responses and transport failures
//! on read paths are logged and reported as [`Lookup::Unavailable`]; POST
//! propagates them.

use std::fmt;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use mindlink_core::{
    DriverRecord, DriversResponse, Geocoded, Lookup, MindConfig, MindError, ScoreEntry, Token,
    VehicleRecord, VehicleState, VehiclesResponse,
};
use mindlink_fetch::{request::build_url, ApiRequest, HttpApi, ReqwestTransport};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, info, instrument, warn};

use crate::auth::TokenManager;
use crate::cache::{CachePolicy, TtlCache};
use crate::placement::TokenPlacement;
use crate::views::{Driver, Vehicle};

// ============================================================================
// Endpoints
// ============================================================================

/// Vehicle list endpoint.
const VEHICLES_ENDPOINT: &str = "vehicles";

/// Driver list endpoint.
const DRIVERS_ENDPOINT: &str = "drivers";

/// Reverse geocoding endpoint.
const GEOCODE_ENDPOINT: &str = "geocoding/reverse";

// ============================================================================
// Client
// ============================================================================

/// Cached client for the Mind API.
///
/// Cheap to clone; all state is shared. The cache mutex is never held
/// across an await point.
#[derive(Clone)]
pub struct MindClient {
    config: Arc<MindConfig>,
    http: Arc<dyn HttpApi>,
    auth: Arc<tokio::sync::Mutex<TokenManager>>,
    cache: Arc<Mutex<TtlCache>>,
    placement: TokenPlacement,
}

impl fmt::Debug for MindClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MindClient")
            .field("base_url", &self.config.base_url)
            .field("placement", &self.placement)
            .finish_non_exhaustive()
    }
}

impl MindClient {
    /// Connects with the production `reqwest` transport.
    ///
    /// Authenticates immediately unless the configuration seeds a token;
    /// an authentication failure propagates and construction fails.
    ///
    /// # Errors
    ///
    /// [`MindError::InvalidConfig`] for a bad configuration,
    /// [`MindError::AuthFailure`] for rejected credentials, transport
    /// errors otherwise.
    pub async fn connect(config: MindConfig) -> Result<Self, MindError> {
        let transport = ReqwestTransport::new(&config.user_agent, config.timeout)?;
        Self::with_transport(config, Arc::new(transport)).await
    }

    /// Connects through a caller-supplied transport. Used by tests to
    /// substitute a canned transport.
    ///
    /// # Errors
    ///
    /// Same as [`MindClient::connect`].
    pub async fn with_transport(
        config: MindConfig,
        http: Arc<dyn HttpApi>,
    ) -> Result<Self, MindError> {
        config.validate()?;

        let mut auth = TokenManager::new(&config);
        if auth.token().is_none() {
            auth.authenticate(http.as_ref()).await?;
        }

        let cache = TtlCache::new(config.cache_ttl, config.cache_capacity);

        Ok(Self {
            config: Arc::new(config),
            http,
            auth: Arc::new(tokio::sync::Mutex::new(auth)),
            cache: Arc::new(Mutex::new(cache)),
            placement: TokenPlacement::AuthHeader,
        })
    }

    /// Sets the token placement for subsequent requests.
    pub fn with_placement(mut self, placement: TokenPlacement) -> Self {
        self.placement = placement;
        self
    }

    /// Returns the session configuration.
    pub fn config(&self) -> &MindConfig {
        &self.config
    }

    // ========================================================================
    // Cache administration
    // ========================================================================

    /// Returns the cache freshness window.
    pub fn cache_ttl(&self) -> Duration {
        self.cache.lock().unwrap().ttl()
    }

    /// Adjusts the cache freshness window.
    pub fn set_cache_ttl(&self, ttl: Duration) {
        self.cache.lock().unwrap().set_ttl(ttl);
    }

    /// Invalidates a single cache entry.
    pub fn bust(&self, key: &str) {
        self.cache.lock().unwrap().bust(key);
    }

    /// Invalidates the entire cache.
    pub fn bust_all(&self) {
        self.cache.lock().unwrap().bust_all();
    }

    // ========================================================================
    // Token administration
    // ========================================================================

    /// Returns a copy of the current session token.
    pub async fn token(&self) -> Option<Token> {
        self.auth.lock().await.token().cloned()
    }

    /// Exchanges the refresh token for a new session token, loading the
    /// persisted token first when none is in memory.
    ///
    /// # Errors
    ///
    /// [`MindError::AuthExpired`] when the refresh token is gone or
    /// rejected.
    pub async fn refresh(&self) -> Result<(), MindError> {
        self.auth.lock().await.refresh(self.http.as_ref()).await
    }

    async fn reauthenticate(&self) -> Result<(), MindError> {
        info!("Token expired, re-authenticating");
        self.auth
            .lock()
            .await
            .authenticate(self.http.as_ref())
            .await
    }

    // ========================================================================
    // HTTP verbs
    // ========================================================================

    /// Issues a cached GET with the default TTL policy.
    ///
    /// # Errors
    ///
    /// Fatal failures only: exhausted token retry, re-authentication
    /// failure, configuration errors. HTTP and transport failures come
    /// back as [`Lookup::Unavailable`].
    pub async fn get(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
    ) -> Result<Lookup<Value>, MindError> {
        self.get_with_policy(endpoint, params, CachePolicy::Ttl).await
    }

    #[instrument(skip(self, params))]
    async fn get_with_policy(
        &self,
        endpoint: &str,
        params: &[(&str, &str)],
        policy: CachePolicy,
    ) -> Result<Lookup<Value>, MindError> {
        let key = cache_key(endpoint, params);

        if let Some(hit) = self.cache.lock().unwrap().get(&key, Utc::now()) {
            debug!(key = %key, "Cache hit");
            return Ok(Lookup::Found(hit));
        }

        let mut reauthed = false;
        loop {
            let url = build_url(&self.config.base_url, endpoint, params)?;
            let mut request = ApiRequest::get(url);

            // Release the auth lock before matching; re-authentication
            // takes it again.
            let applied = self.auth.lock().await.apply(&mut request, self.placement);
            match applied {
                Ok(()) => {}
                Err(MindError::TokenExpired) if !reauthed => {
                    self.reauthenticate().await?;
                    reauthed = true;
                    continue;
                }
                Err(err) => return Err(err),
            }

            let response = match self.http.execute(request).await {
                Ok(response) => response,
                Err(err) => {
                    warn!(endpoint = %endpoint, error = %err, "Mind API request failed");
                    return Ok(Lookup::Unavailable);
                }
            };

            if response.status == StatusCode::UNAUTHORIZED {
                if reauthed {
                    // One transparent retry only; a second expiry surfaces.
                    return Err(MindError::TokenExpired);
                }
                self.reauthenticate().await?;
                reauthed = true;
                continue;
            }

            if response.status == StatusCode::NOT_FOUND {
                return Ok(Lookup::Missing);
            }

            if !response.is_success() {
                error!(endpoint = %endpoint, status = %response.status, "HTTP error from Mind API");
                return Ok(Lookup::Unavailable);
            }

            return match response.json::<Value>() {
                Ok(payload) => {
                    self.cache
                        .lock()
                        .unwrap()
                        .insert(key, payload.clone(), policy, Utc::now());
                    Ok(Lookup::Found(payload))
                }
                Err(err) => {
                    warn!(endpoint = %endpoint, error = %err, "Failed to decode response body");
                    Ok(Lookup::Unavailable)
                }
            };
        }
    }

    /// Issues a POST with a JSON payload and the client credentials
    /// embedded in the query string. Not cached. Gets the same one-shot
    /// expiry retry as GET.
    ///
    /// # Errors
    ///
    /// Unlike GET, every failure propagates: [`MindError::Http`] for a
    /// non-2xx response, [`MindError::Transport`] for transport failures.
    #[instrument(skip(self, body, params))]
    pub async fn post(
        &self,
        endpoint: &str,
        body: &Value,
        params: &[(&str, &str)],
    ) -> Result<StatusCode, MindError> {
        let mut query: Vec<(&str, &str)> = params.to_vec();
        query.push(("client_id", &self.config.client_id));
        query.push(("client_secret", &self.config.client_secret));

        let mut reauthed = false;
        loop {
            let url = build_url(&self.config.base_url, endpoint, &query)?;
            let mut request = ApiRequest::post(url).json(body.clone());

            // Release the auth lock before matching; re-authentication
            // takes it again.
            let applied = self.auth.lock().await.apply(&mut request, self.placement);
            match applied {
                Ok(()) => {}
                Err(MindError::TokenExpired) if !reauthed => {
                    self.reauthenticate().await?;
                    reauthed = true;
                    continue;
                }
                Err(err) => return Err(err),
            }

            let response = self.http.execute(request).await?;

            if response.status == StatusCode::UNAUTHORIZED {
                if reauthed {
                    return Err(MindError::TokenExpired);
                }
                self.reauthenticate().await?;
                reauthed = true;
                continue;
            }

            if !response.is_success() {
                return Err(MindError::Http {
                    status: response.status.as_u16(),
                    message: response.body,
                });
            }

            return Ok(response.status);
        }
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    /// Fetches the vehicle list.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn vehicles(&self) -> Result<Lookup<Vec<VehicleRecord>>, MindError> {
        let payload = self.get(VEHICLES_ENDPOINT, &[]).await?;
        Ok(payload
            .and_then(|value| decode::<VehiclesResponse>(value, VEHICLES_ENDPOINT))
            .map(|response| response.vehicle_jsons))
    }

    /// Fetches a single vehicle record by id.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn vehicle(&self, vehicle_id: &str) -> Result<Lookup<VehicleRecord>, MindError> {
        Ok(self.vehicles().await?.and_then(|records| {
            Lookup::from_option(records.into_iter().find(|r| r.vehicle_id == vehicle_id))
        }))
    }

    /// Fetches the driver list.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn drivers(&self) -> Result<Lookup<Vec<DriverRecord>>, MindError> {
        let payload = self.get(DRIVERS_ENDPOINT, &[]).await?;
        Ok(payload
            .and_then(|value| decode::<DriversResponse>(value, DRIVERS_ENDPOINT))
            .map(|response| response.drivers))
    }

    /// Fetches a single driver record by id.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn driver(&self, driver_id: &str) -> Result<Lookup<DriverRecord>, MindError> {
        Ok(self.drivers().await?.and_then(|records| {
            Lookup::from_option(records.into_iter().find(|r| r.driver_id == driver_id))
        }))
    }

    /// Fetches the state scores of a vehicle, folded into a name→score
    /// mapping.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn vehicle_state(&self, vehicle_id: &str) -> Result<Lookup<VehicleState>, MindError> {
        let endpoint = format!("{VEHICLES_ENDPOINT}/{vehicle_id}/state");
        let payload = self.get(&endpoint, &[]).await?;
        Ok(payload
            .and_then(|value| decode::<Vec<ScoreEntry>>(value, &endpoint))
            .map(VehicleState::from_entries))
    }

    /// Reverse-geocodes a coordinate pair. Results are cached permanently:
    /// coordinates do not change their address.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn geocode(&self, lat: f64, lon: f64) -> Result<Lookup<Geocoded>, MindError> {
        let lat = lat.to_string();
        let lon = lon.to_string();
        let params = [
            ("lat", lat.as_str()),
            ("lon", lon.as_str()),
            ("language", self.config.language.as_str()),
        ];

        let payload = self
            .get_with_policy(GEOCODE_ENDPOINT, &params, CachePolicy::Permanent)
            .await?;
        Ok(payload.and_then(|value| decode::<Geocoded>(value, GEOCODE_ENDPOINT)))
    }

    // ========================================================================
    // View factories
    // ========================================================================

    /// Creates a vehicle view for an identifier. Cheap; no fetch happens
    /// until a field is read.
    pub fn vehicle_view(&self, vehicle_id: impl Into<String>) -> Vehicle {
        Vehicle::new(vehicle_id.into(), self.clone())
    }

    /// Creates a driver view for an identifier.
    pub fn driver_view(&self, driver_id: impl Into<String>) -> Driver {
        Driver::new(driver_id.into(), self.clone())
    }

    /// Lists all vehicles as views.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn vehicle_views(&self) -> Result<Lookup<Vec<Vehicle>>, MindError> {
        Ok(self.vehicles().await?.map(|records| {
            records
                .into_iter()
                .map(|record| self.vehicle_view(record.vehicle_id))
                .collect()
        }))
    }

    /// Lists all drivers as views.
    ///
    /// # Errors
    ///
    /// Fatal failures only; see [`MindClient::get`].
    pub async fn driver_views(&self) -> Result<Lookup<Vec<Driver>>, MindError> {
        Ok(self.drivers().await?.map(|records| {
            records
                .into_iter()
                .map(|record| self.driver_view(record.driver_id))
                .collect()
        }))
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// Cache key: the endpoint, plus the parameters for parameterized lookups.
fn cache_key(endpoint: &str, params: &[(&str, &str)]) -> String {
    if params.is_empty() {
        endpoint.to_string()
    } else {
        let query: Vec<String> = params.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{endpoint}?{}", query.join("&"))
    }
}

fn decode<T: DeserializeOwned>(value: Value, endpoint: &str) -> Lookup<T> {
    match serde_json::from_value(value) {
        Ok(decoded) => Lookup::Found(decoded),
        Err(err) => {
            warn!(endpoint = %endpoint, error = %err, "Unexpected response shape");
            Lookup::Unavailable
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
