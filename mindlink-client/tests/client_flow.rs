//! End-to-end client behavior against a canned transport: cache
//! single-flight, busting, the bounded re-authentication retry, field
//! mapping, and geocode permanence.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use mindlink_client::{Lookup, MindClient, MindConfig, MindError};
use mindlink_core::JWT_TOKEN_TYPE;
use mindlink_fetch::{ApiRequest, ApiResponse, HttpApi, TransportError};
use reqwest::StatusCode;
use serde_json::json;

// ============================================================================
// Mock Transport
// ============================================================================

/// Transport serving canned responses per URL path.
///
/// Responses for a path are consumed in order; the last one repeats. Every
/// executed request is logged with its full URL for call counting.
struct MockTransport {
    routes: Mutex<HashMap<String, VecDeque<(u16, String)>>>,
    log: Mutex<Vec<String>>,
}

impl MockTransport {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            routes: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
        })
    }

    fn route(&self, path: &str, responses: Vec<(u16, serde_json::Value)>) {
        self.routes.lock().unwrap().insert(
            path.to_string(),
            responses
                .into_iter()
                .map(|(status, body)| (status, body.to_string()))
                .collect(),
        );
    }

    fn calls_to(&self, path: &str) -> usize {
        self.log
            .lock()
            .unwrap()
            .iter()
            .filter(|url| url::Url::parse(url).unwrap().path() == path)
            .count()
    }

    fn last_url(&self) -> String {
        self.log.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl HttpApi for MockTransport {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError> {
        self.log.lock().unwrap().push(request.url.to_string());

        let path = request.url.path().to_string();
        let mut routes = self.routes.lock().unwrap();
        let queue = routes
            .get_mut(&path)
            .unwrap_or_else(|| panic!("no canned route for {path}"));

        let (status, body) = if queue.len() > 1 {
            queue.pop_front().unwrap()
        } else {
            queue.front().cloned().unwrap()
        };

        Ok(ApiResponse::new(
            StatusCode::from_u16(status).unwrap(),
            body,
        ))
    }
}

// ============================================================================
// Fixtures
// ============================================================================

const TOKEN_PATH: &str = "/access_token";
const VEHICLES_PATH: &str = "/api/vehicles";
const DRIVERS_PATH: &str = "/api/drivers";
const GEOCODE_PATH: &str = "/api/geocoding/reverse";

fn grant() -> serde_json::Value {
    json!({
        "access_token": "access-1",
        "refresh_token": "refresh-1",
        "token_type": JWT_TOKEN_TYPE,
        "expires_in": 900
    })
}

fn vehicles_payload() -> serde_json::Value {
    json!({
        "vehicleJsons": [{
            "vehicleId": "V1",
            "registrationNumber": "AB-123-C",
            "odometer": 54321.0,
            "fuelLevel": 62.0,
            "rangeFuel": 410.0,
            "lat": 51.0,
            "lon": 4.0
        }]
    })
}

fn config() -> MindConfig {
    MindConfig::new("user@example.com", "hunter2")
        .with_base_url("https://api.test/api/")
        .with_token_url("https://auth.test/access_token")
}

async fn connect(transport: &Arc<MockTransport>, config: MindConfig) -> MindClient {
    transport.route(TOKEN_PATH, vec![(200, grant())]);
    MindClient::with_transport(config, transport.clone())
        .await
        .expect("construction should authenticate")
}

// ============================================================================
// Cache behavior
// ============================================================================

#[tokio::test]
async fn second_get_within_ttl_hits_cache() {
    let transport = MockTransport::new();
    transport.route(VEHICLES_PATH, vec![(200, vehicles_payload())]);
    let client = connect(&transport, config()).await;

    assert!(client.vehicles().await.unwrap().is_found());
    assert!(client.vehicles().await.unwrap().is_found());

    assert_eq!(transport.calls_to(VEHICLES_PATH), 1);
}

#[tokio::test]
async fn elapsed_ttl_forces_second_network_call() {
    let transport = MockTransport::new();
    transport.route(VEHICLES_PATH, vec![(200, vehicles_payload())]);
    let client = connect(&transport, config().with_cache_ttl(Duration::ZERO)).await;

    client.vehicles().await.unwrap();
    client.vehicles().await.unwrap();

    assert_eq!(transport.calls_to(VEHICLES_PATH), 2);
}

#[tokio::test]
async fn bust_forces_refetch_of_that_key() {
    let transport = MockTransport::new();
    transport.route(VEHICLES_PATH, vec![(200, vehicles_payload())]);
    let client = connect(&transport, config()).await;

    client.vehicles().await.unwrap();
    client.bust("vehicles");
    client.vehicles().await.unwrap();

    assert_eq!(transport.calls_to(VEHICLES_PATH), 2);
}

#[tokio::test]
async fn bust_all_forces_refetch_of_every_key() {
    let transport = MockTransport::new();
    transport.route(VEHICLES_PATH, vec![(200, vehicles_payload())]);
    transport.route(DRIVERS_PATH, vec![(200, json!({"drivers": []}))]);
    let client = connect(&transport, config()).await;

    client.vehicles().await.unwrap();
    client.drivers().await.unwrap();
    client.bust_all();
    client.vehicles().await.unwrap();
    client.drivers().await.unwrap();

    assert_eq!(transport.calls_to(VEHICLES_PATH), 2);
    assert_eq!(transport.calls_to(DRIVERS_PATH), 2);
}

// ============================================================================
// Token expiry retry
// ============================================================================

#[tokio::test]
async fn expired_token_reauthenticates_once_and_retries() {
    let transport = MockTransport::new();
    transport.route(
        VEHICLES_PATH,
        vec![(401, json!({})), (200, vehicles_payload())],
    );
    let client = connect(&transport, config()).await;

    let vehicles = client.vehicles().await.unwrap();
    assert!(vehicles.is_found());

    // One grant at construction plus exactly one re-authentication
    assert_eq!(transport.calls_to(TOKEN_PATH), 2);
    assert_eq!(transport.calls_to(VEHICLES_PATH), 2);
}

#[tokio::test]
async fn persistent_expiry_surfaces_after_one_retry() {
    let transport = MockTransport::new();
    transport.route(VEHICLES_PATH, vec![(401, json!({}))]);
    let client = connect(&transport, config()).await;

    let err = client.vehicles().await.unwrap_err();
    assert!(matches!(err, MindError::TokenExpired));

    // Not retried beyond the single transparent cycle
    assert_eq!(transport.calls_to(TOKEN_PATH), 2);
    assert_eq!(transport.calls_to(VEHICLES_PATH), 2);
}

#[tokio::test]
async fn seeded_token_skips_initial_grant() {
    let transport = MockTransport::new();
    transport.route(TOKEN_PATH, vec![(200, grant())]);
    transport.route(VEHICLES_PATH, vec![(200, vehicles_payload())]);

    let token: mindlink_core::Token = serde_json::from_value(grant()).unwrap();
    let client = MindClient::with_transport(config().with_token(token), transport.clone())
        .await
        .unwrap();

    client.vehicles().await.unwrap();
    assert_eq!(transport.calls_to(TOKEN_PATH), 0);
}

#[tokio::test]
async fn stale_seeded_token_reauthenticates_before_get() {
    let transport = MockTransport::new();
    transport.route(TOKEN_PATH, vec![(200, grant())]);
    transport.route(VEHICLES_PATH, vec![(200, vehicles_payload())]);

    let mut token: mindlink_core::Token = serde_json::from_value(grant()).unwrap();
    token.expires_at = Some(0);

    let client = MindClient::with_transport(config().with_token(token), transport.clone())
        .await
        .unwrap();

    // The pre-flight expiry check fires before any API call; one grant,
    // then the fetch goes through.
    let vehicles = client.vehicles().await.unwrap();
    assert!(vehicles.is_found());
    assert_eq!(transport.calls_to(TOKEN_PATH), 1);
    assert_eq!(transport.calls_to(VEHICLES_PATH), 1);
}

#[tokio::test]
async fn stale_seeded_token_reauthenticates_before_post() {
    let transport = MockTransport::new();
    transport.route(TOKEN_PATH, vec![(200, grant())]);
    transport.route("/api/commands", vec![(204, json!({}))]);

    let mut token: mindlink_core::Token = serde_json::from_value(grant()).unwrap();
    token.expires_at = Some(0);

    let client = MindClient::with_transport(config().with_token(token), transport.clone())
        .await
        .unwrap();

    let status = client
        .post("commands", &json!({"action": "lock"}), &[])
        .await
        .unwrap();

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(transport.calls_to(TOKEN_PATH), 1);
}

// ============================================================================
// Field mapping
// ============================================================================

#[tokio::test]
async fn vehicle_view_projects_license_plate() {
    let transport = MockTransport::new();
    transport.route(VEHICLES_PATH, vec![(200, vehicles_payload())]);
    let client = connect(&transport, config()).await;

    let plate = client.vehicle_view("V1").license_plate().await.unwrap();
    assert_eq!(plate, Lookup::Found("AB-123-C".to_string()));
}

#[tokio::test]
async fn unknown_vehicle_is_missing() {
    let transport = MockTransport::new();
    transport.route(VEHICLES_PATH, vec![(200, vehicles_payload())]);
    let client = connect(&transport, config()).await;

    let plate = client.vehicle_view("V9").license_plate().await.unwrap();
    assert_eq!(plate, Lookup::Missing);
}

#[tokio::test]
async fn state_scores_fold_into_named_metrics() {
    let transport = MockTransport::new();
    transport.route(
        "/api/vehicles/V1/state",
        vec![(200, json!([{"scoreType": "range_electric", "score": 42}]))],
    );
    let client = connect(&transport, config()).await;

    let range = client.vehicle_view("V1").range_electric().await.unwrap();
    assert_eq!(range, Lookup::Found(42.0));
}

#[tokio::test]
async fn driver_view_projects_names() {
    let transport = MockTransport::new();
    transport.route(
        DRIVERS_PATH,
        vec![(
            200,
            json!({"drivers": [{"driverId": "D1", "firstName": "An", "lastName": "Peeters"}]}),
        )],
    );
    let client = connect(&transport, config()).await;

    let driver = client.driver_view("D1");
    assert_eq!(
        driver.full_name().await.unwrap(),
        Lookup::Found("An Peeters".to_string())
    );
}

// ============================================================================
// Geocoding
// ============================================================================

#[tokio::test]
async fn geocode_is_cached_permanently() {
    let transport = MockTransport::new();
    transport.route(
        GEOCODE_PATH,
        vec![(200, json!({"formattedAddress": "Grote Markt 1", "city": "Antwerpen"}))],
    );
    // TTL of zero: every TTL-policy entry is immediately stale
    let client = connect(&transport, config().with_cache_ttl(Duration::ZERO)).await;

    let first = client.geocode(51.0, 4.0).await.unwrap();
    let second = client.geocode(51.0, 4.0).await.unwrap();

    assert_eq!(first, second);
    assert!(first.is_found());
    assert_eq!(transport.calls_to(GEOCODE_PATH), 1);
}

#[tokio::test]
async fn vehicle_address_resolves_position_then_geocodes() {
    let transport = MockTransport::new();
    transport.route(VEHICLES_PATH, vec![(200, vehicles_payload())]);
    transport.route(
        GEOCODE_PATH,
        vec![(200, json!({"city": "Antwerpen"}))],
    );
    let client = connect(&transport, config()).await;

    let address = client.vehicle_view("V1").address().await.unwrap();
    let found = address.ok().unwrap();
    assert_eq!(found.city.as_deref(), Some("Antwerpen"));

    // The geocode request carried the vehicle coordinates
    let url = transport.last_url();
    assert!(url.contains("lat=51"));
    assert!(url.contains("lon=4"));
}

// ============================================================================
// Error surfacing
// ============================================================================

#[tokio::test]
async fn http_error_on_get_is_unavailable() {
    let transport = MockTransport::new();
    transport.route(VEHICLES_PATH, vec![(500, json!({"error": "boom"}))]);
    let client = connect(&transport, config()).await;

    assert_eq!(client.vehicles().await.unwrap(), Lookup::Unavailable);
    // Failures are never cached
    client.vehicles().await.unwrap();
    assert_eq!(transport.calls_to(VEHICLES_PATH), 2);
}

#[tokio::test]
async fn not_found_on_get_is_missing() {
    let transport = MockTransport::new();
    transport.route(VEHICLES_PATH, vec![(404, json!({}))]);
    let client = connect(&transport, config()).await;

    assert_eq!(client.vehicles().await.unwrap(), Lookup::Missing);
}

#[tokio::test]
async fn post_propagates_http_errors() {
    let transport = MockTransport::new();
    transport.route("/api/commands", vec![(503, json!({"error": "down"}))]);
    let client = connect(&transport, config()).await;

    let err = client
        .post("commands", &json!({"action": "lock"}), &[])
        .await
        .unwrap_err();
    assert!(matches!(err, MindError::Http { status: 503, .. }));
}

#[tokio::test]
async fn post_gets_the_same_expiry_retry_as_get() {
    let transport = MockTransport::new();
    transport.route("/api/commands", vec![(401, json!({})), (204, json!({}))]);
    let client = connect(&transport, config()).await;

    let status = client
        .post("commands", &json!({"action": "lock"}), &[])
        .await
        .unwrap();

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(transport.calls_to(TOKEN_PATH), 2);

    // Client credentials ride along in the query string
    let url = transport.last_url();
    assert!(url.contains("client_id="));
    assert!(url.contains("client_secret="));
}
