//! # docgate
//!
//! A document-store CRUD gateway: open one connection to a document database,
//! optionally seed fixture collections, then expose each configured collection
//! as a REST route group.
//!
//! ## Features
//!
//! - **Ordered startup**: connect, seed, then listen; a failure at any step aborts
//! - **Idempotent seeding**: collections are cleared before fixtures are inserted
//! - **Nested filters**: dotted paths reach into sub-documents and embedded sequences
//! - **Cursor refinements**: sort, limit and projection on list routes
//! - **Optional schemas**: per-resource required fields and value kinds
//! - **Pluggable stores**: in-memory by default, MongoDB behind `mongodb_backend`
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use docgate::prelude::*;
//!
//! let config = GatewayConfig::in_memory("inventoryDB")
//!     .with_resource(ResourceConfig::new("books", "bookCollection"));
//!
//! GatewayBuilder::new(config).build()?.run().await?;
//! ```

pub mod config;
pub mod core;
pub mod resources;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        connection::{Connection, ConnectionState},
        document::{Document, ID_FIELD},
        error::{FieldError, GatewayError, GatewayResult},
        events::{DocumentEvent, EventBus, EventEnvelope, GatewayEvent, LifecycleEvent},
        query::{Comparison, Predicate, Query, QueryOptions, QueryParams, QueryTranslator},
        schema::{FieldKind, FieldRule, Schema},
        seed::{FixtureSource, Generator, SeedLoader},
        store::{Connector, DocumentStore},
    };

    // === Config ===
    pub use crate::config::{
        BackendKind, GatewayConfig, NotFoundPolicy, Operation, ResourceConfig, SeedConfig,
        ViewConfig,
    };

    // === Resources ===
    pub use crate::resources::{ResourceRegistry, ResourceService, ResourceState};

    // === Storage ===
    pub use crate::storage::{InMemoryConnector, InMemoryStore};
    #[cfg(feature = "mongodb_backend")]
    pub use crate::storage::{MongoConnector, MongoStore};

    // === Server ===
    pub use crate::server::{BoundGateway, Gateway, GatewayBuilder, Phase, ServerHost, build_router};

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
