//! Store traits for document operations
//!
//! The gateway treats the document database as an external collaborator. Any
//! backend that can implement [`DocumentStore`] can sit behind the HTTP layer;
//! a [`Connector`] produces one from a URI and database name.

use crate::core::document::Document;
use crate::core::query::{Predicate, Query};
use anyhow::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Asynchronous document CRUD over named collections
///
/// Every operation may suspend while the backend answers and may fail with a
/// store-level error. Operations that touch "one" document act on the first
/// match in the store's natural iteration order.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert a document, returning it as stored (with its `_id`)
    async fn insert_one(&self, collection: &str, document: Document) -> Result<Document>;

    /// Insert documents in order, returning how many were inserted
    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<usize>;

    /// Materialize every document matching the query
    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>>;

    /// First document matching the filter
    async fn find_one(&self, collection: &str, filter: &[Predicate]) -> Result<Option<Document>>;

    /// Set the patch fields on the first match and return the updated document
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &[Predicate],
        patch: Document,
    ) -> Result<Option<Document>>;

    /// Remove the first match and return it
    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: &[Predicate],
    ) -> Result<Option<Document>>;

    /// Remove every match, returning how many were removed
    async fn delete_many(&self, collection: &str, filter: &[Predicate]) -> Result<u64>;
}

/// Opens a session to a document store
#[async_trait]
pub trait Connector: Send + Sync {
    /// Connect and confirm the session is usable
    async fn connect(&self, uri: &str, database: &str) -> Result<Arc<dyn DocumentStore>>;
}
