//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection, deadline wrapping, catalog service bootstrap
//! - `routes/`: HTTP routes + handlers (one generic router per entity kind)
//! - `dto.rs`: outcome → JSON mapping
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: Arc<AppServices>) -> Router {
    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/api", routes::router())
        .layer(ServiceBuilder::new().layer(Extension(services)))
}
