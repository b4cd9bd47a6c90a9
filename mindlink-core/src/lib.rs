// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Mindlink Core
//!
//! Core types, models, and configuration for the Mindlink client library.
//!
//! This crate provides the foundational abstractions used by the other
//! Mindlink crates, including:
//!
//! - Domain models (vehicles, drivers, state scores, geocode results)
//! - The OAuth2 token model with the Mind custom token-type tag
//! - Error types
//! - Client configuration with the Mind fleet defaults
//! - The [`Lookup`] result type for read accessors
//!
//! ## Key Types
//!
//! - [`MindConfig`] - Construction parameters (credentials, TTL, timeout)
//! - [`Token`] - OAuth2 token with expiry metadata
//! - [`VehicleRecord`] / [`DriverRecord`] - Backing records from the API
//! - [`VehicleState`] - Score entries folded into a name→score mapping
//! - [`Geocoded`] - Reverse-geocode result
//! - [`Lookup`] - Found / Missing / Unavailable read result
//! - [`MindError`] - Error taxonomy

pub mod config;
pub mod error;
pub mod lookup;
pub mod models;

// Re-export error type
pub use error::MindError;

// Re-export configuration
pub use config::MindConfig;

// Re-export the lookup result
pub use lookup::Lookup;

// Re-export all model types
pub use models::{
    DriverRecord, DriversResponse, Geocoded, ScoreEntry, Token, VehicleRecord, VehicleState,
    VehiclesResponse, JWT_TOKEN_TYPE,
};
