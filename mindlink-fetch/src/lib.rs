// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # Mindlink Fetch
//!
//! HTTP transport abstraction for the Mindlink client library.
//!
//! Requests are built as [`ApiRequest`] values so the token manager can
//! inject credentials into a *pending* request before it is executed. The
//! [`HttpApi`] trait is the seam between the client and the network; the
//! production implementation is [`ReqwestTransport`], and tests substitute
//! their own implementations.

pub mod error;
pub mod request;
pub mod transport;

pub use error::TransportError;
pub use request::{ApiRequest, ApiResponse, RequestBody};
pub use transport::{HttpApi, ReqwestTransport};
