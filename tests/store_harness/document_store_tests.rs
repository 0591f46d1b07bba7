//! Macro-generated test suite for the `DocumentStore` contract.
//!
//! The `document_store_tests!` macro generates a test module that validates
//! any `DocumentStore` implementation: inserts, nested and embedded-sequence
//! filters, cursor refinements, first-match mutation and bulk deletion.
//!
//! # Usage
//!
//! ```rust,ignore
//! #[macro_use]
//! mod store_harness;
//!
//! use store_harness::*;
//! use docgate::storage::InMemoryStore;
//!
//! document_store_tests!(InMemoryStore::new());
//! ```
//!
//! # Generated Tests
//!
//! - `test_insert_one_assigns_id` / `test_insert_one_keeps_supplied_id`
//! - `test_insert_many_rejects_repeated_id`
//! - `test_find_on_empty_collection`
//! - `test_nested_comparison` / `test_embedded_sequence_equality`
//! - `test_comparison_skips_missing_fields`
//! - `test_sort_limit_projection`
//! - `test_key_lookup_matches_typed_value`
//! - `test_update_first_match_returns_post_image` / `test_update_without_match`
//! - `test_find_one_and_delete`
//! - `test_delete_many_clears_collection`
//! - `test_embedded_order_survives_round_trip`

/// Generate a `DocumentStore` conformance test suite.
///
/// `$factory` must evaluate to a fresh, empty store implementing
/// `DocumentStore`. It is re-evaluated for each test.
#[macro_export]
macro_rules! document_store_tests {
    ($factory:expr) => {
        mod document_store_contract_tests {
            use super::*;
            use docgate::core::query::{Comparison, Predicate, Query, SortDirection, SortSpec};
            use docgate::core::store::DocumentStore;
            use serde_json::json;

            #[tokio::test]
            async fn test_insert_one_assigns_id() {
                let store = $factory;
                let created = store
                    .insert_one("bookCollection", doc(json!({"title": "T", "author": "A"})))
                    .await
                    .unwrap();
                assert!(created.id().and_then(|id| id.as_str()).is_some());

                let all = store.find("bookCollection", &Query::all()).await.unwrap();
                assert_eq!(all.len(), 1);
                assert_eq!(all[0].get("title"), Some(&json!("T")));
                assert_eq!(all[0].get("author"), Some(&json!("A")));
                assert_eq!(all[0].id(), created.id());
            }

            #[tokio::test]
            async fn test_insert_one_keeps_supplied_id() {
                let store = $factory;
                let created = store
                    .insert_one("genres", doc(json!({"_id": "drama", "name": "Drama"})))
                    .await
                    .unwrap();
                assert_eq!(created.id(), Some(&json!("drama")));

                let found = store
                    .find_one("genres", &[Predicate::key("_id", "drama")])
                    .await
                    .unwrap();
                assert_eq!(found.unwrap().get("name"), Some(&json!("Drama")));
            }

            #[tokio::test]
            async fn test_insert_many_rejects_repeated_id() {
                let store = $factory;
                let result = store
                    .insert_many(
                        "genres",
                        vec![
                            doc(json!({"_id": "drama", "name": "Drama"})),
                            doc(json!({"_id": "drama", "name": "Tragedy"})),
                        ],
                    )
                    .await;
                assert!(result.is_err());
            }

            #[tokio::test]
            async fn test_find_on_empty_collection() {
                let store = $factory;
                assert!(store.find("nothing", &Query::all()).await.unwrap().is_empty());
                assert!(store.find_one("nothing", &[]).await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_nested_comparison() {
                let store = $factory;
                store.insert_many("authorList", books()).await.unwrap();

                let query = Query::with_filter(vec![Predicate::new(
                    "information.price",
                    Comparison::Lt,
                    json!(10),
                )]);
                let found = store.find("authorList", &query).await.unwrap();
                assert_eq!(titles(&found), vec!["Between the Lines"]);
            }

            #[tokio::test]
            async fn test_embedded_sequence_equality() {
                let store = $factory;
                store.insert_many("authorList", books()).await.unwrap();

                let query =
                    Query::with_filter(vec![Predicate::eq("authors.featured", json!(true))]);
                let found = store.find("authorList", &query).await.unwrap();
                assert_eq!(titles(&found), vec!["Between the Lines", "Good Omens"]);

                let query = Query::with_filter(vec![Predicate::eq(
                    "authors.name",
                    json!("Lisa Lutz"),
                )]);
                let found = store.find("authorList", &query).await.unwrap();
                assert_eq!(titles(&found), vec!["Heads You Lose"]);
            }

            #[tokio::test]
            async fn test_comparison_skips_missing_fields() {
                let store = $factory;
                store
                    .insert_many(
                        "mixed",
                        vec![doc(json!({"n": 1})), doc(json!({"m": 1})), doc(json!({"n": 5}))],
                    )
                    .await
                    .unwrap();

                let query =
                    Query::with_filter(vec![Predicate::new("n", Comparison::Gt, json!(-1))]);
                assert_eq!(store.find("mixed", &query).await.unwrap().len(), 2);

                let query =
                    Query::with_filter(vec![Predicate::new("n", Comparison::Lte, json!(1))]);
                assert_eq!(store.find("mixed", &query).await.unwrap().len(), 1);
            }

            #[tokio::test]
            async fn test_sort_limit_projection() {
                let store = $factory;
                assert_eq!(store.insert_many("numberList", numbers()).await.unwrap(), 12);

                let query = Query {
                    filter: vec![],
                    sort: Some(SortSpec {
                        field: "number".into(),
                        direction: SortDirection::Descending,
                    }),
                    limit: Some(3),
                    projection: Some(vec!["number".into()]),
                };
                let found = store.find("numberList", &query).await.unwrap();
                assert_eq!(number_values(&found), vec![1000, 90, 15]);
                assert!(found.iter().all(|d| d.contains("_id") && d.len() == 2));

                let ascending = Query {
                    sort: Some(SortSpec {
                        field: "number".into(),
                        direction: SortDirection::Ascending,
                    }),
                    limit: Some(2),
                    ..Query::default()
                };
                let found = store.find("numberList", &ascending).await.unwrap();
                assert_eq!(number_values(&found), vec![-3, 1]);
            }

            #[tokio::test]
            async fn test_key_lookup_matches_typed_value() {
                let store = $factory;
                store.insert_many("numberList", numbers()).await.unwrap();

                let found = store
                    .find_one("numberList", &[Predicate::key("number", "1000")])
                    .await
                    .unwrap();
                assert_eq!(found.unwrap().get("number"), Some(&json!(1000)));

                let missing = store
                    .find_one("numberList", &[Predicate::key("number", "does-not-exist")])
                    .await
                    .unwrap();
                assert!(missing.is_none());
            }

            #[tokio::test]
            async fn test_update_first_match_returns_post_image() {
                let store = $factory;
                store
                    .insert_many(
                        "genres",
                        vec![
                            doc(json!({"name": "Rock", "rank": 1})),
                            doc(json!({"name": "Rock", "rank": 2})),
                        ],
                    )
                    .await
                    .unwrap();

                let updated = store
                    .find_one_and_update(
                        "genres",
                        &[Predicate::eq("name", json!("Rock"))],
                        doc(json!({"name": "Jazz", "_id": "ignored"})),
                    )
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(updated.get("name"), Some(&json!("Jazz")));
                assert_ne!(updated.id(), Some(&json!("ignored")));

                let rock = store
                    .find(
                        "genres",
                        &Query::with_filter(vec![Predicate::eq("name", json!("Rock"))]),
                    )
                    .await
                    .unwrap();
                assert_eq!(rock.len(), 1, "exactly one document mutates");
            }

            #[tokio::test]
            async fn test_update_without_match() {
                let store = $factory;
                let result = store
                    .find_one_and_update(
                        "genres",
                        &[Predicate::eq("name", json!("Nothing"))],
                        doc(json!({"name": "Something"})),
                    )
                    .await
                    .unwrap();
                assert!(result.is_none());
                assert!(store.find("genres", &Query::all()).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_find_one_and_delete() {
                let store = $factory;
                store
                    .insert_many(
                        "bookCollection",
                        vec![doc(json!({"title": "K1"})), doc(json!({"title": "K2"}))],
                    )
                    .await
                    .unwrap();

                let removed = store
                    .find_one_and_delete("bookCollection", &[Predicate::eq("title", json!("K1"))])
                    .await
                    .unwrap()
                    .unwrap();
                assert_eq!(removed.get("title"), Some(&json!("K1")));

                let rest = store.find("bookCollection", &Query::all()).await.unwrap();
                assert_eq!(titles(&rest), vec!["K2"]);

                let again = store
                    .find_one_and_delete("bookCollection", &[Predicate::eq("title", json!("K1"))])
                    .await
                    .unwrap();
                assert!(again.is_none());
            }

            #[tokio::test]
            async fn test_delete_many_clears_collection() {
                let store = $factory;
                store.insert_many("numberList", numbers()).await.unwrap();

                let removed = store
                    .delete_many(
                        "numberList",
                        &[Predicate::new("number", Comparison::Gte, json!(12))],
                    )
                    .await
                    .unwrap();
                assert_eq!(removed, 4);

                let removed = store.delete_many("numberList", &[]).await.unwrap();
                assert_eq!(removed, 8);
                assert!(store.find("numberList", &Query::all()).await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_embedded_order_survives_round_trip() {
                let store = $factory;
                store.insert_many("authorList", books()).await.unwrap();

                let found = store
                    .find_one("authorList", &[Predicate::eq("title", json!("Between the Lines"))])
                    .await
                    .unwrap()
                    .unwrap();
                let names: Vec<&str> = found
                    .get("authors")
                    .and_then(|a| a.as_array())
                    .unwrap()
                    .iter()
                    .filter_map(|a| a.get("name").and_then(|n| n.as_str()))
                    .collect();
                assert_eq!(names, vec!["Jodi Picoult", "Samantha Van Leer"]);
            }
        }
    };
}
