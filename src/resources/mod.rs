//! Resources: one configured collection exposed as an HTTP route group
//!
//! - [`service`]: the create/list/filteredList/getByKey/update/delete operations
//! - [`handlers`]: axum handlers shaping service results into responses
//! - [`registry`]: per-resource route construction

pub mod handlers;
pub mod registry;
pub mod service;

pub use handlers::ResourceState;
pub use registry::{ResourceDescriptor, ResourceRegistry, ResourceRoutes};
pub use service::ResourceService;
