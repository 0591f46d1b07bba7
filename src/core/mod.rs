//! Core module containing the document model, store traits and startup primitives

pub mod connection;
pub mod document;
pub mod error;
pub mod events;
pub mod query;
pub mod schema;
pub mod seed;
pub mod store;

pub use connection::{Connection, ConnectionState};
pub use document::{Document, ID_FIELD};
pub use error::{GatewayError, GatewayResult};
pub use events::{DocumentEvent, EventBus, EventEnvelope, GatewayEvent, LifecycleEvent};
pub use query::{Comparison, Predicate, Query, QueryOptions, QueryParams, QueryTranslator};
pub use schema::{FieldKind, FieldRule, Schema};
pub use seed::{FixtureSource, Generator, SeedLoader};
pub use store::{Connector, DocumentStore};
