//! MongoDB storage backend using the official MongoDB async driver.
//!
//! Provides [`MongoStore`], a [`DocumentStore`] backed by a `mongodb::Database`,
//! and [`MongoConnector`], which opens the client and confirms the session with
//! a `ping` before reporting success.
//!
//! # Feature flag
//!
//! This module is gated behind the `mongodb_backend` feature flag:
//! ```toml
//! [dependencies]
//! docgate = { version = "0.1", features = ["mongodb_backend"] }
//! ```
//!
//! # Serialization strategy
//!
//! Documents travel as `serde_json::Value` and are converted to BSON at this
//! boundary. Results are converted back through relaxed extended JSON, so
//! numbers and strings come out as plain JSON values.
//!
//! # Query translation
//!
//! Each [`Predicate`] becomes one `{ path: { $op: value } }` clause; dotted
//! paths are passed through unchanged, which gives MongoDB's native nested and
//! array-element matching. Sort, limit and projection map to find options.

use crate::core::document::{Document, ID_FIELD};
use crate::core::query::{Comparison, Predicate, Query};
use crate::core::store::{Connector, DocumentStore};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, Bson, doc};
use mongodb::options::ReturnDocument;
use mongodb::{Client, Database};
use std::sync::Arc;

// ---------------------------------------------------------------------------
// Conversion helpers
// ---------------------------------------------------------------------------

/// Convert a gateway document into a BSON document.
fn to_bson_document(document: Document) -> Result<bson::Document> {
    let bson_val = bson::to_bson(&document.into_value())
        .map_err(|e| anyhow!("Failed to convert JSON to BSON: {}", e))?;

    match bson_val {
        Bson::Document(d) => Ok(d),
        _ => Err(anyhow!("Expected BSON document, got non-object")),
    }
}

/// Convert a BSON document back into a gateway document.
fn from_bson_document(document: bson::Document) -> Result<Document> {
    Document::from_value(Bson::Document(document).into_relaxed_extjson())
        .ok_or_else(|| anyhow!("Expected JSON object from BSON document"))
}

fn to_bson_value(value: &serde_json::Value) -> Result<Bson> {
    bson::to_bson(value).map_err(|e| anyhow!("Failed to convert filter value to BSON: {}", e))
}

/// Build a MongoDB filter from conjunctive predicates.
fn filter_document(filter: &[Predicate]) -> Result<bson::Document> {
    let mut clauses = Vec::with_capacity(filter.len());
    for predicate in filter {
        let operand = to_bson_value(&predicate.value)?;
        let clause = match predicate.op {
            Comparison::Eq => doc! { predicate.path.as_str(): operand },
            op => doc! { predicate.path.as_str(): { op.operator(): operand } },
        };
        clauses.push(clause);
    }

    // Several clauses on one path cannot share a single document key
    Ok(match clauses.len() {
        0 => doc! {},
        1 => clauses.remove(0),
        _ => doc! { "$and": clauses },
    })
}

/// Build the projection document; `_id` is included by MongoDB by default.
fn projection_document(fields: &[String]) -> bson::Document {
    let mut projection = bson::Document::new();
    for field in fields {
        projection.insert(field.as_str(), 1);
    }
    projection
}

// ---------------------------------------------------------------------------
// MongoStore
// ---------------------------------------------------------------------------

/// Document store backed by MongoDB.
///
/// # Example
///
/// ```rust,ignore
/// use mongodb::Client;
/// use docgate::storage::MongoStore;
///
/// let client = Client::with_uri_str("mongodb://127.0.0.1:27017").await?;
/// let store = MongoStore::new(client.database("inventoryDB"));
/// let book = store.insert_one("bookCollection", book).await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Create a new `MongoStore` with the given database handle.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Get a reference to the underlying database.
    pub fn database(&self) -> &Database {
        &self.database
    }

    fn collection(&self, name: &str) -> mongodb::Collection<bson::Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    /// Insert a document, assigning a UUID string `_id` when absent.
    async fn insert_one(&self, collection: &str, mut document: Document) -> Result<Document> {
        document.ensure_id();
        let bson_doc = to_bson_document(document.clone())?;

        self.collection(collection)
            .insert_one(bson_doc)
            .await
            .map_err(|e| anyhow!("Failed to insert document: {}", e))?;

        Ok(document)
    }

    async fn insert_many(&self, collection: &str, documents: Vec<Document>) -> Result<usize> {
        if documents.is_empty() {
            return Ok(0);
        }

        let bson_docs = documents
            .into_iter()
            .map(|mut document| {
                document.ensure_id();
                to_bson_document(document)
            })
            .collect::<Result<Vec<_>>>()?;

        let result = self
            .collection(collection)
            .insert_many(bson_docs)
            .await
            .map_err(|e| anyhow!("Failed to insert documents: {}", e))?;

        Ok(result.inserted_ids.len())
    }

    async fn find(&self, collection: &str, query: &Query) -> Result<Vec<Document>> {
        let coll = self.collection(collection);
        let mut find = coll.find(filter_document(&query.filter)?);

        if let Some(sort) = &query.sort {
            find = find.sort(doc! { sort.field.as_str(): sort.direction.as_i32() });
        }
        if let Some(limit) = query.limit {
            let limit =
                i64::try_from(limit).map_err(|_| anyhow!("limit {} is out of range", limit))?;
            find = find.limit(limit);
        }
        if let Some(fields) = &query.projection {
            find = find.projection(projection_document(fields));
        }

        let cursor = find
            .await
            .map_err(|e| anyhow!("Failed to find documents: {}", e))?;

        let docs: Vec<bson::Document> = cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect documents: {}", e))?;

        docs.into_iter().map(from_bson_document).collect()
    }

    async fn find_one(&self, collection: &str, filter: &[Predicate]) -> Result<Option<Document>> {
        let doc = self
            .collection(collection)
            .find_one(filter_document(filter)?)
            .await
            .map_err(|e| anyhow!("Failed to find document: {}", e))?;

        doc.map(from_bson_document).transpose()
    }

    /// Apply the patch with `$set` and return the post-image.
    async fn find_one_and_update(
        &self,
        collection: &str,
        filter: &[Predicate],
        mut patch: Document,
    ) -> Result<Option<Document>> {
        patch.remove(ID_FIELD);
        if patch.is_empty() {
            return self.find_one(collection, filter).await;
        }

        let update = doc! { "$set": to_bson_document(patch)? };
        let doc = self
            .collection(collection)
            .find_one_and_update(filter_document(filter)?, update)
            .return_document(ReturnDocument::After)
            .await
            .map_err(|e| anyhow!("Failed to update document: {}", e))?;

        doc.map(from_bson_document).transpose()
    }

    async fn find_one_and_delete(
        &self,
        collection: &str,
        filter: &[Predicate],
    ) -> Result<Option<Document>> {
        let doc = self
            .collection(collection)
            .find_one_and_delete(filter_document(filter)?)
            .await
            .map_err(|e| anyhow!("Failed to delete document: {}", e))?;

        doc.map(from_bson_document).transpose()
    }

    async fn delete_many(&self, collection: &str, filter: &[Predicate]) -> Result<u64> {
        let result = self
            .collection(collection)
            .delete_many(filter_document(filter)?)
            .await
            .map_err(|e| anyhow!("Failed to delete documents: {}", e))?;

        Ok(result.deleted_count)
    }
}

// ---------------------------------------------------------------------------
// MongoConnector
// ---------------------------------------------------------------------------

/// Opens a [`MongoStore`] from a connection string.
///
/// The driver connects lazily, so a `ping` is issued against the target
/// database; a server that cannot be reached fails here instead of on the
/// first request.
#[derive(Clone, Debug, Default)]
pub struct MongoConnector;

impl MongoConnector {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Connector for MongoConnector {
    async fn connect(&self, uri: &str, database: &str) -> Result<Arc<dyn DocumentStore>> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|e| anyhow!("Invalid MongoDB connection string: {}", e))?;

        let database = client.database(database);
        database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| anyhow!("MongoDB did not answer ping: {}", e))?;

        Ok(Arc::new(MongoStore::new(database)))
    }
}
