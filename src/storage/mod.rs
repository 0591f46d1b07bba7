//! Storage implementations for different backends

pub mod evaluator;
pub mod in_memory;
#[cfg(feature = "mongodb_backend")]
pub mod mongodb;

pub use in_memory::{InMemoryConnector, InMemoryStore};
#[cfg(feature = "mongodb_backend")]
pub use mongodb::{MongoConnector, MongoStore};
