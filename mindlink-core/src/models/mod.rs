//! Domain models for the Mind API.

mod driver;
mod geocode;
mod state;
mod token;
mod vehicle;

pub use driver::{DriverRecord, DriversResponse};
pub use geocode::Geocoded;
pub use state::{ScoreEntry, VehicleState};
pub use token::{Token, JWT_TOKEN_TYPE};
pub use vehicle::{VehicleRecord, VehiclesResponse};
