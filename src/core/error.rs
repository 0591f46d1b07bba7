//! Typed error handling for the gateway
//!
//! # Error Categories
//!
//! - [`GatewayError::Connection`]: the store could not be opened (fatal at startup)
//! - [`GatewayError::Seed`]: fixtures could not be loaded (fatal at startup)
//! - [`GatewayError::Config`]: the configuration is unusable (fatal at startup)
//! - [`GatewayError::Listener`]: the HTTP listener could not bind or serve (fatal)
//! - [`GatewayError::Validation`]: a request body was rejected by the schema
//! - [`GatewayError::InvalidQuery`]: a filter, sort or limit was malformed
//! - [`GatewayError::Store`]: an underlying store call failed
//!
//! Absence of a document is not an error: lookups return `Ok(None)` and the
//! HTTP layer decides how to encode it (see [`NotFoundPolicy`]).
//!
//! [`NotFoundPolicy`]: crate::config::NotFoundPolicy

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use thiserror::Error;

/// Boxed error used as the source of wrapped failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Result alias used throughout the gateway
pub type GatewayResult<T> = std::result::Result<T, GatewayError>;

/// Message returned to HTTP callers for every failure
pub const GENERIC_MESSAGE: &str = "something went wrong";

/// A single field rejected by schema validation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// The main error type for the gateway
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to open database '{database}': {source}")]
    Connection {
        database: String,
        #[source]
        source: BoxError,
    },

    #[error("failed to seed collection '{collection}': {source}")]
    Seed {
        collection: String,
        #[source]
        source: BoxError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("listener failed: {0}")]
    Listener(#[from] std::io::Error),

    #[error("validation failed: {}", describe_fields(.0))]
    Validation(Vec<FieldError>),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("{operation} on collection '{collection}' failed: {source}")]
    Store {
        operation: &'static str,
        collection: String,
        #[source]
        source: BoxError,
    },
}

fn describe_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| format!("{} ({})", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Error response body sent to HTTP callers
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: &'static str,
    /// Always [`GENERIC_MESSAGE`]; diagnostic detail is logged, never returned
    pub message: &'static str,
}

impl GatewayError {
    /// Wrap a failed store call
    pub fn store(
        operation: &'static str,
        collection: impl Into<String>,
        source: anyhow::Error,
    ) -> Self {
        GatewayError::Store {
            operation,
            collection: collection.into(),
            source: source.into(),
        }
    }

    /// Wrap a failed seeding step
    pub fn seed(collection: impl Into<String>, source: anyhow::Error) -> Self {
        GatewayError::Seed {
            collection: collection.into(),
            source: source.into(),
        }
    }

    pub fn invalid_query(message: impl Into<String>) -> Self {
        GatewayError::InvalidQuery(message.into())
    }

    /// Whether this error must abort process startup
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            GatewayError::Connection { .. }
                | GatewayError::Seed { .. }
                | GatewayError::Config(_)
                | GatewayError::Listener(_)
        )
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            GatewayError::Connection { .. } => "CONNECTION_ERROR",
            GatewayError::Seed { .. } => "SEED_ERROR",
            GatewayError::Config(_) => "CONFIG_ERROR",
            GatewayError::Listener(_) => "LISTENER_ERROR",
            GatewayError::Validation(_) => "VALIDATION_ERROR",
            GatewayError::InvalidQuery(_) => "INVALID_QUERY",
            GatewayError::Store { .. } => "STORE_ERROR",
        }
    }

    /// Every failure surfaces as a generic server error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code(),
            message: GENERIC_MESSAGE,
        }
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        tracing::error!(code = self.error_code(), error = %self, "request failed");
        let status = self.status_code();
        (status, Json(self.to_response())).into_response()
    }
}
