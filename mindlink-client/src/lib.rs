// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Mindlink Client
//!
//! Cached client for the Mind connected-car telematics API.
//!
//! The client authenticates with an OAuth2 password grant (the Mind
//! provider issues tokens with a custom token-type tag), caches GET
//! results with a per-key TTL, re-authenticates once and retries when a
//! token expires mid-session, and exposes vehicle and driver data through
//! read-only view facades.
//!
//! ```no_run
//! use mindlink_client::MindClient;
//! use mindlink_core::MindConfig;
//!
//! # async fn run() -> Result<(), mindlink_core::MindError> {
//! let config = MindConfig::new("user@example.com", "password");
//! let client = MindClient::connect(config).await?;
//!
//! if let Some(vehicles) = client.vehicle_views().await?.ok() {
//!     for vehicle in vehicles {
//!         println!("{:?}", vehicle.license_plate().await?);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod cache;
pub mod client;
pub mod placement;
pub mod views;

pub use auth::TokenManager;
pub use cache::{CachePolicy, TtlCache};
pub use client::MindClient;
pub use placement::TokenPlacement;
pub use views::{Driver, Vehicle};

// Re-export the core surface callers need alongside the client.
pub use mindlink_core::{Lookup, MindConfig, MindError, Token};
