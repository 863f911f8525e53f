//! Read-only HTTP surface.
//!
//! # Routes
//! - `GET /health`: component name and lifecycle state
//! - `GET /v1/tenants/{tenant}/devices`: one page of a tenant's devices
//! - `GET /v1/tenants/{tenant}/devices/{name}`: a single device record

pub mod error;
pub mod handlers;

use axum::{extract::Request, routing::get, Router};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::lifecycle::LifecycleState;
use crate::registry::RegistryStore;
use self::handlers::*;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<dyn RegistryStore>,
    pub component: &'static str,
    pub state: watch::Receiver<LifecycleState>,
    /// Parent of every request span. Connection tasks do not inherit it.
    pub span: Span,
}

/// Build the API router.
pub fn router(state: ApiState) -> Router {
    let parent = state.span.clone();
    let trace = TraceLayer::new_for_http().make_span_with(move |request: &Request| {
        tracing::debug_span!(
            parent: &parent,
            "request",
            method = %request.method(),
            uri = %request.uri(),
            version = ?request.version()
        )
    });

    Router::new()
        .route("/health", get(get_health))
        .route("/v1/tenants/{tenant}/devices", get(list_devices))
        .route("/v1/tenants/{tenant}/devices/{name}", get(get_device))
        .with_state(state)
        .layer(trace)
}
