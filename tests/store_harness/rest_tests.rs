//! Macro-generated REST integration tests.
//!
//! The `rest_integration_tests!` macro bootstraps the sample gateway (see
//! [`sample_config`](super::sample_config)) on top of a given store
//! configuration and drives it over HTTP with `axum_test::TestServer`.
//!
//! # Usage
//!
//! ```rust,ignore
//! rest_integration_tests!(GatewayConfig::in_memory("harness"));
//! ```

/// Generate the REST integration suite.
///
/// `$base` must evaluate to a `GatewayConfig` whose store section points at a
/// fresh database. Resources and seeds are added by the harness.
#[macro_export]
macro_rules! rest_integration_tests {
    ($base:expr) => {
        mod rest_integration_tests {
            use super::*;
            use axum::http::StatusCode;
            use serde_json::{Value, json};

            #[tokio::test]
            async fn test_create_then_list() {
                let server = sample_server($base).await;

                let created: Value = server
                    .post("/books")
                    .json(&json!({"title": "T", "author": "A"}))
                    .await
                    .json();
                assert_eq!(created["title"], "T");
                assert!(created["_id"].is_string());

                let books: Vec<Value> = server.get("/books").await.json();
                assert_eq!(books.len(), 1);
                assert_eq!(books[0]["title"], "T");
                assert_eq!(books[0]["author"], "A");
            }

            #[tokio::test]
            async fn test_delete_removes_only_that_key() {
                let server = sample_server($base).await;

                let k1: Value = server.post("/books").json(&json!({"title": "K1"})).await.json();
                server.post("/books").json(&json!({"title": "K2"})).await.assert_status_ok();

                let id = k1["_id"].as_str().unwrap();
                let deleted: Value = server.delete(&format!("/books/{id}")).await.json();
                assert_eq!(deleted["title"], "K1");

                let books: Vec<Value> = server.get("/books").await.json();
                assert_eq!(books.len(), 1);
                assert_eq!(books[0]["title"], "K2");
            }

            #[tokio::test]
            async fn test_nested_price_filter() {
                let server = sample_server($base).await;

                let cheap: Vec<Value> = server.get("/authors/price-less-than-10").await.json();
                assert_eq!(cheap.len(), 1);
                assert_eq!(cheap[0]["title"], "Between the Lines");
                assert_eq!(cheap[0]["information"]["price"], 5);

                let filtered: Vec<Value> = server
                    .get("/authors")
                    .add_query_param("filter", r#"{"information.price<": 10}"#)
                    .await
                    .json();
                assert_eq!(filtered, cheap);
            }

            #[tokio::test]
            async fn test_featured_authors_view() {
                let server = sample_server($base).await;

                let featured: Vec<Value> = server.get("/authors/featured").await.json();
                let mut titles: Vec<&str> =
                    featured.iter().filter_map(|b| b["title"].as_str()).collect();
                titles.sort();
                assert_eq!(titles, vec!["Between the Lines", "Good Omens"]);
                for book in &featured {
                    let authors = book["authors"].as_array().unwrap();
                    assert!(authors.iter().any(|a| a["featured"] == true));
                }
            }

            #[tokio::test]
            async fn test_cursor_refinements() {
                let server = sample_server($base).await;

                let all: Vec<Value> = server.get("/numbers").await.json();
                assert_eq!(all.len(), 12);

                let top: Vec<Value> = server.get("/numbers/top").await.json();
                let values: Vec<i64> = top.iter().filter_map(|d| d["number"].as_i64()).collect();
                assert_eq!(values, vec![1000, 90, 15]);

                let small: Vec<Value> = server
                    .get("/numbers")
                    .add_query_param("filter", r#"{"number<": 3}"#)
                    .add_query_param("sort", "number")
                    .add_query_param("limit", "2")
                    .add_query_param("fields", "number")
                    .await
                    .json();
                let values: Vec<i64> = small.iter().filter_map(|d| d["number"].as_i64()).collect();
                assert_eq!(values, vec![-3, 1]);
            }

            #[tokio::test]
            async fn test_get_by_key_not_found_is_null() {
                let server = sample_server($base).await;

                let response = server.get("/authors/does-not-exist").await;
                response.assert_status_ok();
                assert_eq!(response.json::<Value>(), Value::Null);

                let found: Value = server.get("/authors/Good%20Omens").await.json();
                assert_eq!(found["information"]["ISBN"], "9780425132159");
            }

            #[tokio::test]
            async fn test_status404_policy() {
                let server = sample_server($base).await;

                let response = server.get("/genres/does-not-exist").await;
                response.assert_status(StatusCode::NOT_FOUND);
                assert_eq!(response.json::<Value>(), Value::Null);

                server.post("/genres").json(&json!({"name": "Drama"})).await.assert_status_ok();
                let updated: Value = server
                    .put("/genres/Drama")
                    .json(&json!({"name": "Tragedy"}))
                    .await
                    .json();
                assert_eq!(updated["name"], "Tragedy");

                server.get("/genres/Drama").await.assert_status(StatusCode::NOT_FOUND);
                server.delete("/genres/Tragedy").await.assert_status_ok();
                server.delete("/genres/Tragedy").await.assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_failures_are_generic_500() {
                let server = sample_server($base).await;

                let missing_title = server
                    .post("/books")
                    .json(&json!({"author": "A"}))
                    .expect_failure()
                    .await;
                missing_title.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
                let body: Value = missing_title.json();
                assert_eq!(body["code"], "VALIDATION_ERROR");
                assert_eq!(body["message"], "something went wrong");

                let bad_filter = server
                    .get("/authors")
                    .add_query_param("filter", r#"{"information.price<": "ten"}"#)
                    .expect_failure()
                    .await;
                bad_filter.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(bad_filter.json::<Value>()["code"], "INVALID_QUERY");

                let bad_limit = server
                    .get("/numbers")
                    .add_query_param("limit", "many")
                    .expect_failure()
                    .await;
                bad_limit.assert_status(StatusCode::INTERNAL_SERVER_ERROR);

                let huge_limit = server
                    .get("/numbers")
                    .add_query_param("limit", usize::MAX.to_string())
                    .expect_failure()
                    .await;
                huge_limit.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
                assert_eq!(huge_limit.json::<Value>()["code"], "INVALID_QUERY");
            }

            #[tokio::test]
            async fn test_undecodable_key_is_generic_500() {
                let server = sample_server($base).await;

                for response in [
                    server.get("/genres/%FF").expect_failure().await,
                    server
                        .put("/genres/%FF")
                        .json(&json!({"name": "Drama"}))
                        .expect_failure()
                        .await,
                    server.delete("/genres/%FF").expect_failure().await,
                ] {
                    response.assert_status(StatusCode::INTERNAL_SERVER_ERROR);
                    let body: Value = response.json();
                    assert_eq!(body["code"], "INVALID_QUERY");
                    assert_eq!(body["message"], "something went wrong");
                }
            }

            #[tokio::test]
            async fn test_disabled_operations_are_not_routed() {
                let server = sample_server($base).await;

                server
                    .post("/authors")
                    .json(&json!({"title": "New"}))
                    .expect_failure()
                    .await
                    .assert_status(StatusCode::METHOD_NOT_ALLOWED);
                server
                    .delete("/authors/Good%20Omens")
                    .expect_failure()
                    .await
                    .assert_status(StatusCode::METHOD_NOT_ALLOWED);
            }

            #[tokio::test]
            async fn test_health() {
                let server = sample_server($base).await;
                let health: Value = server.get("/health").await.json();
                assert_eq!(health["status"], "ok");
                assert_eq!(health["service"], "docgate");
                assert_eq!(health["state"], "open");
            }
        }
    };
}
