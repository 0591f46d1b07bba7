//! Fixture seeding
//!
//! The [`SeedLoader`] replaces the contents of a collection with a fixture
//! set: it clears whatever a previous run left behind and then inserts the
//! fixtures in order, so running it twice never doubles the data.
//!
//! Fixtures are either literal documents or generated ones. Generated values
//! vary between runs; the number of documents and their field set do not.

use crate::core::document::Document;
use crate::core::error::{GatewayError, GatewayResult};
use crate::core::store::DocumentStore;
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

const FIRST_NAMES: &[&str] = &[
    "Aaran", "Aaren", "Aarez", "Aarman", "Aaron", "Abbas", "Abdul", "Abel", "Ada", "Adele",
    "Aisha", "Alba", "Bea", "Callum", "Dara", "Elio", "Farah", "Grace", "Hugo", "Iris", "Jonah",
    "Kai", "Lena", "Milo", "Nina", "Omar", "Priya", "Quinn", "Rosa", "Theo", "Uma", "Zane",
];

const LAST_NAMES: &[&str] = &[
    "Smith", "Jones", "Coollastname", "Enright", "Arrowood", "Kim", "Garcia", "Okafor", "Rossi",
    "Novak", "Tanaka", "Silva", "Murphy", "Nguyen", "Ibrahim", "Larsen", "Moreau", "Patel",
];

/// Generator for fabricated fixtures
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Generator {
    /// People with `first`, `last` and an `age` between 1 and 99
    Users { count: usize },
}

impl Generator {
    /// Number of documents this generator produces
    pub fn count(&self) -> usize {
        match self {
            Generator::Users { count } => *count,
        }
    }

    pub fn generate(&self) -> Vec<Document> {
        let mut rng = rand::thread_rng();
        match self {
            Generator::Users { count } => (0..*count).map(|_| random_user(&mut rng)).collect(),
        }
    }
}

fn random_user(rng: &mut impl Rng) -> Document {
    let first = FIRST_NAMES.choose(rng).copied().unwrap_or("Ada");
    let last = LAST_NAMES.choose(rng).copied().unwrap_or("Smith");
    let age: u32 = rng.gen_range(1..=99);

    let mut document = Document::new();
    document.insert("first", json!(first));
    document.insert("last", json!(last));
    document.insert("age", json!(age));
    document
}

/// Where a fixture set comes from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixtureSource {
    /// Literal documents, inserted as written
    Fixtures(Vec<Document>),
    /// Documents fabricated on every run
    Generate(Generator),
}

impl FixtureSource {
    /// Materialize the fixture set
    pub fn fixtures(&self) -> Vec<Document> {
        match self {
            FixtureSource::Fixtures(documents) => documents.clone(),
            FixtureSource::Generate(generator) => generator.generate(),
        }
    }
}

/// Clears and refills collections with fixtures
#[derive(Clone)]
pub struct SeedLoader {
    store: Arc<dyn DocumentStore>,
}

impl SeedLoader {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// Replace the collection contents with `fixtures`
    ///
    /// Returns the number of documents inserted. Any store failure aborts the
    /// seed with a [`GatewayError::Seed`].
    pub async fn seed(&self, collection: &str, fixtures: Vec<Document>) -> GatewayResult<usize> {
        let cleared = self
            .store
            .delete_many(collection, &[])
            .await
            .map_err(|e| GatewayError::seed(collection, e))?;
        if cleared > 0 {
            tracing::debug!(collection, cleared, "cleared previous fixtures");
        }

        if fixtures.is_empty() {
            return Ok(0);
        }

        let inserted = self
            .store
            .insert_many(collection, fixtures)
            .await
            .map_err(|e| GatewayError::seed(collection, e))?;

        tracing::info!(collection, inserted, "seeded collection");
        Ok(inserted)
    }

    /// Materialize `source` and seed it into `collection`
    pub async fn seed_from(&self, collection: &str, source: &FixtureSource) -> GatewayResult<usize> {
        self.seed(collection, source.fixtures()).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SeedConfig;
    use crate::core::query::Query;
    use crate::storage::InMemoryStore;
    use std::collections::BTreeSet;

    #[test]
    fn test_generated_users_have_stable_shape() {
        let users = Generator::Users { count: 10 }.generate();
        assert_eq!(users.len(), 10);

        for user in &users {
            let fields: BTreeSet<&str> = user.fields().collect();
            assert_eq!(fields, BTreeSet::from(["age", "first", "last"]));
            let age = user.get("age").and_then(|v| v.as_u64()).unwrap();
            assert!((1..=99).contains(&age));
        }
    }

    #[test]
    fn test_fixture_source_from_seed_entry() {
        let generated: SeedConfig = serde_yaml::from_str(
            r#"
collection: users
generate:
  kind: users
  count: 3
"#,
        )
        .unwrap();
        assert_eq!(generated.collection, "users");
        assert_eq!(
            generated.source,
            FixtureSource::Generate(Generator::Users { count: 3 })
        );

        let literal: SeedConfig = serde_yaml::from_str(
            r#"
collection: numberList
fixtures:
  - number: 1
  - number: 7
"#,
        )
        .unwrap();
        assert_eq!(literal.source.fixtures().len(), 2);
    }

    #[tokio::test]
    async fn test_seed_twice_does_not_duplicate() {
        let store = InMemoryStore::new();
        let loader = SeedLoader::new(Arc::new(store.clone()));
        let source = FixtureSource::Fixtures(
            [1, 7, -3]
                .into_iter()
                .filter_map(|n| Document::from_value(json!({ "number": n })))
                .collect(),
        );

        assert_eq!(loader.seed_from("numberList", &source).await.unwrap(), 3);
        assert_eq!(loader.seed_from("numberList", &source).await.unwrap(), 3);
        assert_eq!(store.count("numberList").unwrap(), 3);
    }

    #[tokio::test]
    async fn test_seed_replaces_foreign_documents() {
        let store = InMemoryStore::new();
        store
            .insert_one(
                "users",
                Document::from_value(json!({"leftover": true})).unwrap(),
            )
            .await
            .unwrap();

        let loader = SeedLoader::new(Arc::new(store.clone()));
        let source = FixtureSource::Generate(Generator::Users { count: 4 });
        loader.seed_from("users", &source).await.unwrap();

        let users = store.find("users", &Query::all()).await.unwrap();
        assert_eq!(users.len(), 4);
        assert!(users.iter().all(|u| !u.contains("leftover")));
    }

    #[tokio::test]
    async fn test_seed_empty_fixture_set_clears() {
        let store = InMemoryStore::new();
        let loader = SeedLoader::new(Arc::new(store.clone()));
        let source = FixtureSource::Generate(Generator::Users { count: 2 });
        loader.seed_from("users", &source).await.unwrap();

        let inserted = loader.seed("users", Vec::new()).await.unwrap();
        assert_eq!(inserted, 0);
        assert_eq!(store.count("users").unwrap(), 0);
    }
}
