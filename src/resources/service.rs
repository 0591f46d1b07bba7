//! Resource operations
//!
//! A [`ResourceService`] binds one configured resource to a collection in the
//! open store and implements the six operations a resource may expose:
//! create, list, filtered list, get by key, update and delete. The HTTP layer
//! only decides which of them are reachable.
//!
//! Lookups by key never fail for absence; they return `Ok(None)`.

use crate::config::ResourceConfig;
use crate::core::document::Document;
use crate::core::error::{FieldError, GatewayError, GatewayResult};
use crate::core::events::{DocumentEvent, EventBus};
use crate::core::query::{Predicate, Query, QueryParams, QueryTranslator};
use crate::core::store::DocumentStore;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// The operations of one resource over its collection
pub struct ResourceService {
    config: ResourceConfig,
    store: Arc<dyn DocumentStore>,
    events: EventBus,
    views: HashMap<String, Query>,
}

impl ResourceService {
    /// Bind a resource to the store
    ///
    /// Named views are translated here, once; a view that does not translate
    /// is a configuration error.
    pub fn new(
        config: ResourceConfig,
        store: Arc<dyn DocumentStore>,
        events: EventBus,
    ) -> GatewayResult<Self> {
        let translator = QueryTranslator::new(config.schema.as_ref());
        let mut views = HashMap::with_capacity(config.views.len());
        for view in &config.views {
            let query = translator
                .translate(view.filter.as_ref(), &view.options())
                .map_err(|e| {
                    GatewayError::Config(format!(
                        "view '{}' of resource '{}': {e}",
                        view.name, config.name
                    ))
                })?;
            views.insert(view.name.clone(), query);
        }

        Ok(Self {
            config,
            store,
            events,
            views,
        })
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    pub fn config(&self) -> &ResourceConfig {
        &self.config
    }

    fn collection(&self) -> &str {
        &self.config.collection
    }

    fn translator(&self) -> QueryTranslator<'_> {
        QueryTranslator::new(self.config.schema.as_ref())
    }

    fn key_filter(&self, key: &str) -> [Predicate; 1] {
        [Predicate::key(&self.config.key, key)]
    }

    fn key_of(&self, document: &Document) -> Value {
        document.get(&self.config.key).cloned().unwrap_or(Value::Null)
    }

    /// Insert one document built from the request body
    pub async fn create(&self, body: Value) -> GatewayResult<Document> {
        let document = into_document(body)?;
        let document = match &self.config.schema {
            Some(schema) => schema.validate_create(document)?,
            None => document,
        };

        let created = self
            .store
            .insert_one(self.collection(), document)
            .await
            .map_err(|e| GatewayError::store("insertOne", self.collection(), e))?;

        tracing::debug!(resource = %self.name(), "created document");
        self.events.document(DocumentEvent::Created {
            resource: self.name().to_string(),
            key: self.key_of(&created),
            data: created.clone().into_value(),
        });
        Ok(created)
    }

    /// Every document of the collection
    pub async fn list(&self) -> GatewayResult<Vec<Document>> {
        self.query(&Query::all()).await
    }

    /// Documents matching caller-supplied filter and cursor refinements
    pub async fn filtered_list(&self, params: &QueryParams) -> GatewayResult<Vec<Document>> {
        let query = self.translator().translate_params(params)?;
        self.query(&query).await
    }

    /// Run an already-translated query
    pub async fn query(&self, query: &Query) -> GatewayResult<Vec<Document>> {
        self.store
            .find(self.collection(), query)
            .await
            .map_err(|e| GatewayError::store("find", self.collection(), e))
    }

    /// Run a named view, `None` when the resource has no such view
    pub async fn view(&self, name: &str) -> GatewayResult<Option<Vec<Document>>> {
        match self.views.get(name) {
            Some(query) => self.query(query).await.map(Some),
            None => Ok(None),
        }
    }

    pub fn view_names(&self) -> impl Iterator<Item = &str> {
        self.views.keys().map(String::as_str)
    }

    pub async fn get_by_key(&self, key: &str) -> GatewayResult<Option<Document>> {
        self.store
            .find_one(self.collection(), &self.key_filter(key))
            .await
            .map_err(|e| GatewayError::store("findOne", self.collection(), e))
    }

    /// Patch the first document with the given key and return its new state
    pub async fn update(&self, key: &str, patch: Value) -> GatewayResult<Option<Document>> {
        let patch = into_document(patch)?;
        if let Some(schema) = &self.config.schema {
            schema.validate_patch(&patch)?;
        }

        let updated = self
            .store
            .find_one_and_update(self.collection(), &self.key_filter(key), patch)
            .await
            .map_err(|e| GatewayError::store("findOneAndUpdate", self.collection(), e))?;

        if let Some(document) = &updated {
            self.events.document(DocumentEvent::Updated {
                resource: self.name().to_string(),
                key: self.key_of(document),
                data: document.clone().into_value(),
            });
        }
        Ok(updated)
    }

    /// Remove the first document with the given key and return it
    pub async fn delete(&self, key: &str) -> GatewayResult<Option<Document>> {
        let deleted = self
            .store
            .find_one_and_delete(self.collection(), &self.key_filter(key))
            .await
            .map_err(|e| GatewayError::store("findOneAndDelete", self.collection(), e))?;

        if let Some(document) = &deleted {
            self.events.document(DocumentEvent::Deleted {
                resource: self.name().to_string(),
                key: self.key_of(document),
            });
        }
        Ok(deleted)
    }
}

fn into_document(body: Value) -> GatewayResult<Document> {
    Document::from_value(body).ok_or_else(|| {
        GatewayError::Validation(vec![FieldError::new("body", "must be a JSON object")])
    })
}
