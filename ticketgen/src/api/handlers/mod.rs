//! HTTP request handlers.
//!
//! - [`health`]: status and liveness endpoints
//! - [`tickets`]: ticket generation from uploaded requirements

pub mod health;
pub mod tickets;
