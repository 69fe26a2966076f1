//! Contact and appointment form backend.
//!
//! A single JSON endpoint validates a submission, rate limits the client and
//! relays a Turkish notification email through an SMTP relay.

pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod limiter;
pub mod models;
pub mod notifier;
pub mod service;
pub mod validation;

use axum::{
    Router,
    http::{HeaderValue, header},
    routing::any,
};
use tower_http::{set_header::SetResponseHeaderLayer, trace::TraceLayer};

use std::sync::Arc;

use crate::{config::ServerConfig, limiter::RateLimiter, service::ContactService};

pub struct AppState {
    pub service: ContactService,
    pub limiter: RateLimiter,
    pub trust_forwarded_for: bool,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(service: ContactService, config: &ServerConfig) -> Self {
        Self {
            service,
            limiter: RateLimiter::new(config.window(), config.session_ttl()),
            trust_forwarded_for: config.trust_forwarded_for,
            max_body_bytes: config.max_body_bytes,
        }
    }
}

/// Every path and method lands on the submission handler, which answers
/// anything but POST with 405.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", any(handlers::rest::submit))
        .route("/{*path}", any(handlers::rest::submit))
        .with_state(state)
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static("*"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("POST"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        ))
        .layer(TraceLayer::new_for_http())
}
