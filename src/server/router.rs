//! REST router construction
//!
//! Produces one axum `Router` from a [`ServerHost`]: health routes, every
//! resource route group, and request tracing.

use crate::core::connection::Connection;
use crate::server::host::ServerHost;
use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Value, json};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Build the complete REST router
pub fn build_router(host: &ServerHost) -> Router {
    health_routes(host.connection.clone())
        .merge(host.registry.build_routes())
        .layer(TraceLayer::new_for_http())
}

fn health_routes(connection: Arc<Connection>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/healthz", get(health_check))
        .with_state(connection)
}

async fn health_check(State(connection): State<Arc<Connection>>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "docgate",
        "state": connection.state(),
    }))
}
