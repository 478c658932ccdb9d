//! HTTP API: route handlers and their request/response models.
//!
//! - **[`handlers`]**: Axum route handlers
//! - **[`models`]**: Response bodies and query parameters
//!
//! # Endpoints
//!
//! - `GET /`: service status
//! - `GET /healthz`: plain-text liveness probe
//! - `POST /api/generate-tickets`: multipart upload of requirements and diagrams, answered with
//!   the extracted epic hierarchy
//!
//! All endpoints are documented with `utoipa`; the interactive reference is served at `/docs`.

pub mod handlers;
pub mod models;
