//! In-memory document store for testing and development

use crate::core::document::Document;
use crate::core::query::{Predicate, Query};
use crate::core::store::{Connector, DocumentStore};
use crate::storage::evaluator;
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

/// In-memory document store
///
/// Each collection is an insertion-ordered list, which is the store's natural
/// iteration order for first-match operations. Uses RwLock for thread-safe
/// access; clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<HashMap<String, Vec<Document>>>>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents currently held in a collection
    pub fn count(&self, collection: &str) -> Result<usize> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections.get(collection).map_or(0, Vec::len))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<Document> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        document.ensure_id();
        let documents = collections.entry(collection.to_string()).or_default();
        if let Some(id) = document.id()
            && documents.iter().any(|existing| existing.id() == Some(id))
        {
            return Err(anyhow!("Duplicate _id {} in collection {}", id, collection));
        }

        documents.push(document.clone());
        Ok(document)
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<usize> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let target = collections.entry(collection.to_string()).or_default();
        let count = documents.len();
        let mut accepted: Vec<Document> = Vec::with_capacity(count);
        for mut document in documents {
            let id = document.ensure_id().clone();
            if target
                .iter()
                .chain(accepted.iter())
                .any(|existing| existing.id() == Some(&id))
            {
                return Err(anyhow!("Duplicate _id {} in collection {}", id, collection));
            }
            accepted.push(document);
        }
        target.extend(accepted);

        Ok(count)
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections
            .get(collection)
            .map(|documents| evaluator::apply(documents, query))
            .unwrap_or_default())
    }

    async fn find_one(&self, collection: &str, filter: &[Predicate]) -> Result<Option<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections.get(collection).and_then(|documents| {
            documents
                .iter()
                .find(|document| evaluator::matches_all(document, filter))
                .cloned()
        }))
    }

    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &[Predicate],
        patch: Document,
    ) -> Result<Option<Document>> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(documents) = collections.get_mut(collection) else {
            return Ok(None);
        };

        Ok(documents
            .iter_mut()
            .find(|document| evaluator::matches_all(document, filter))
            .map(|document| {
                document.apply_patch(&patch);
                document.clone()
            }))
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: &[Predicate],
    ) -> Result<Option<Document>> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(documents) = collections.get_mut(collection) else {
            return Ok(None);
        };

        let position = documents
            .iter()
            .position(|document| evaluator::matches_all(document, filter));

        Ok(position.map(|index| documents.remove(index)))
    }

    async fn delete_many(&self, collection: &str, filter: &[Predicate]) -> Result<u64> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(documents) = collections.get_mut(collection) else {
            return Ok(0);
        };

        let before = documents.len();
        documents.retain(|document| !evaluator::matches_all(document, filter));
        Ok((before - documents.len()) as u64)
    }
}

/// Connector handing out one shared [`InMemoryStore`]
///
/// The URI and database name are accepted for symmetry with real backends
/// and otherwise ignored.
#[derive(Clone, Default)]
pub struct InMemoryConnector {
    store: InMemoryStore,
}

impl InMemoryConnector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Connector that opens onto an existing store
    pub fn with_store(store: InMemoryStore) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Connector for InMemoryConnector {
    async fn connect(&self, _uri: &str, database: &str) -> Result<Arc<dyn DocumentStore>> {
        tracing::debug!(database, "opening in-memory store");
        Ok(Arc::new(self.store.clone()))
    }
}
