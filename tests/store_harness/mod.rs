//! Shared test harness for store backend testing
//!
//! Provides the fixture sets used across suites (the embedded-author book
//! list, the number list, genres) and a gateway configuration exposing them,
//! so that every backend is checked against the same data.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//! use store_harness::*;
//!
//! document_store_tests!(InMemoryStore::new());
//! rest_integration_tests!(GatewayConfig::in_memory("harness"));
//! ```

#![allow(dead_code)]

pub mod document_store_tests;
pub mod rest_tests;

use axum_test::TestServer;
use docgate::prelude::*;
use serde_json::{Value, json};

pub const NUMBERS: [i64; 12] = [1, 7, -3, 11, 12, 1000, 8, 2, 15, 4, 2, 90];

pub fn doc(value: Value) -> Document {
    Document::from_value(value).expect("fixture must be a JSON object")
}

/// Three books with embedded authors and nested pricing
pub fn books() -> Vec<Document> {
    vec![
        doc(json!({
            "title": "Good Omens",
            "authors": [
                { "name": "Neil Gaiman", "featured": true },
                { "name": "Terry Pratchett", "featured": true }
            ],
            "information": { "ISBN": "9780425132159", "price": 10, "total_in_stock": 10 }
        })),
        doc(json!({
            "title": "Heads You Lose",
            "authors": [
                { "name": "Lisa Lutz", "featured": false },
                { "name": "David Hayward", "featured": false }
            ],
            "information": { "ISBN": "9780399157400", "price": 20, "total_in_stock": 8 }
        })),
        doc(json!({
            "title": "Between the Lines",
            "authors": [
                { "name": "Jodi Picoult", "featured": true },
                { "name": "Samantha Van Leer", "featured": false }
            ],
            "information": { "ISBN": "9781451635751", "price": 5, "total_in_stock": 5 }
        })),
    ]
}

pub fn numbers() -> Vec<Document> {
    NUMBERS.iter().map(|n| doc(json!({ "number": n }))).collect()
}

/// Sorted titles of a result set, for order-independent comparisons
pub fn titles(documents: &[Document]) -> Vec<String> {
    let mut titles: Vec<String> = documents
        .iter()
        .filter_map(|d| d.get("title").and_then(Value::as_str).map(String::from))
        .collect();
    titles.sort();
    titles
}

pub fn number_values(documents: &[Document]) -> Vec<i64> {
    documents
        .iter()
        .filter_map(|d| d.get("number").and_then(Value::as_i64))
        .collect()
}

/// Extend a base configuration (store settings) with the sample resources
pub fn sample_config(base: GatewayConfig) -> GatewayConfig {
    let book_schema = Schema::new(vec![
        FieldRule::required("title", FieldKind::String),
        FieldRule::optional("author", FieldKind::String),
    ]);

    base.with_resource(ResourceConfig::new("books", "bookCollection").with_schema(book_schema))
        .with_resource(
            ResourceConfig::new("authors", "authorList")
                .with_operations([Operation::List, Operation::FilteredList, Operation::GetByKey])
                .with_key("title")
                .with_view(ViewConfig {
                    name: "price-less-than-10".into(),
                    filter: Some(json!({"information.price<": 10})),
                    sort: None,
                    limit: None,
                    fields: None,
                })
                .with_view(ViewConfig {
                    name: "featured".into(),
                    filter: Some(json!({"authors.featured": true})),
                    sort: None,
                    limit: None,
                    fields: None,
                }),
        )
        .with_resource(
            ResourceConfig::new("numbers", "numberList")
                .with_operations([Operation::List, Operation::FilteredList])
                .with_view(ViewConfig {
                    name: "top".into(),
                    filter: None,
                    sort: Some("number:desc".into()),
                    limit: Some(3),
                    fields: None,
                }),
        )
        .with_resource(
            ResourceConfig::new("genres", "genres")
                .with_key("name")
                .with_not_found(NotFoundPolicy::Status404),
        )
        .with_seed("authorList", FixtureSource::Fixtures(books()))
        .with_seed("numberList", FixtureSource::Fixtures(numbers()))
}

/// Bootstrap the sample gateway (connect + seed) and wrap its router
pub async fn sample_server(base: GatewayConfig) -> TestServer {
    let gateway = GatewayBuilder::new(sample_config(base))
        .build()
        .expect("sample configuration is valid");
    let host = gateway.prepare().await.expect("gateway should prepare");
    TestServer::try_new(build_router(&host)).expect("Failed to create test server")
}
