//! REST client for the GreenView integration API.
//!
//! Wraps every outbound call, records failures to a diagnostic sink, and
//! never panics or raises across its boundary: callers get a
//! [`GatewayError`] they can inspect instead.

pub mod api;
pub mod error;

pub use api::{CallTrace, GreenViewApi};
pub use error::GatewayError;
