//! HTTP handlers for resource operations
//!
//! Handlers are resource-agnostic: each route group carries its own
//! [`ResourceState`], and the handler only shapes the service result into a
//! response. Failures become [`GatewayError`] responses (generic 500).

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;

use crate::config::{NotFoundPolicy, Operation};
use crate::core::document::Document;
use crate::core::error::{FieldError, GatewayError, GatewayResult};
use crate::core::query::QueryParams;
use crate::resources::service::ResourceService;

/// State shared by every route of one resource
#[derive(Clone)]
pub struct ResourceState {
    pub service: Arc<ResourceService>,
}

impl ResourceState {
    pub fn new(service: Arc<ResourceService>) -> Self {
        Self { service }
    }

    fn not_found_policy(&self) -> NotFoundPolicy {
        self.service.config().not_found
    }

    /// Encode an optional lookup result per the resource's not-found policy
    fn found(&self, document: Option<Document>) -> Response {
        match (document, self.not_found_policy()) {
            (Some(document), _) => Json(document).into_response(),
            (None, NotFoundPolicy::Null) => Json(Value::Null).into_response(),
            (None, NotFoundPolicy::Status404) => {
                (StatusCode::NOT_FOUND, Json(Value::Null)).into_response()
            }
        }
    }
}

fn body(payload: Result<Json<Value>, JsonRejection>) -> GatewayResult<Value> {
    payload
        .map(|Json(value)| value)
        .map_err(|rejection| {
            GatewayError::Validation(vec![FieldError::new("body", rejection.body_text())])
        })
}

fn path_key(path: Result<Path<String>, PathRejection>) -> GatewayResult<String> {
    path.map(|Path(key)| key)
        .map_err(|rejection| GatewayError::invalid_query(rejection.body_text()))
}

/// POST /{resource}
pub async fn create_document(
    State(state): State<ResourceState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> GatewayResult<Json<Document>> {
    let created = state.service.create(body(payload)?).await?;
    Ok(Json(created))
}

/// GET /{resource}
///
/// Without query-string refinements this is a plain list; with any of
/// `filter`, `sort`, `limit` or `fields` it is a filtered list. Each form is
/// only answered when its operation is enabled.
pub async fn list_documents(
    State(state): State<ResourceState>,
    params: Result<Query<QueryParams>, QueryRejection>,
) -> GatewayResult<Json<Vec<Document>>> {
    let Query(params) =
        params.map_err(|rejection| GatewayError::invalid_query(rejection.body_text()))?;

    let documents = if params.has_refinements() {
        if !state.service.config().allows(Operation::FilteredList) {
            return Err(GatewayError::invalid_query(format!(
                "resource '{}' does not accept filters",
                state.service.name()
            )));
        }
        state.service.filtered_list(&params).await?
    } else {
        if !state.service.config().allows(Operation::List) {
            return Err(GatewayError::invalid_query(format!(
                "resource '{}' only lists with a filter, sort, limit or fields",
                state.service.name()
            )));
        }
        state.service.list().await?
    };

    Ok(Json(documents))
}

/// GET /{resource}/{key}
pub async fn get_document(
    State(state): State<ResourceState>,
    path: Result<Path<String>, PathRejection>,
) -> GatewayResult<Response> {
    let key = path_key(path)?;
    let document = state.service.get_by_key(&key).await?;
    Ok(state.found(document))
}

/// PUT /{resource}/{key}
pub async fn update_document(
    State(state): State<ResourceState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> GatewayResult<Response> {
    let key = path_key(path)?;
    let updated = state.service.update(&key, body(payload)?).await?;
    Ok(state.found(updated))
}

/// DELETE /{resource}/{key}
pub async fn delete_document(
    State(state): State<ResourceState>,
    path: Result<Path<String>, PathRejection>,
) -> GatewayResult<Response> {
    let key = path_key(path)?;
    let deleted = state.service.delete(&key).await?;
    Ok(state.found(deleted))
}

/// GET /{resource}/{view}
pub async fn view_documents(state: ResourceState, view: &str) -> GatewayResult<Response> {
    match state.service.view(view).await? {
        Some(documents) => Ok(Json(documents).into_response()),
        None => Ok(state.found(None)),
    }
}
