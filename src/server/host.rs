//! Server host
//!
//! A `ServerHost` holds everything the HTTP layer needs once the store is
//! open and seeded: the configuration, the connection, one service per
//! resource and the event bus. It is transport-agnostic; [`build_router`]
//! turns it into an axum router.
//!
//! [`build_router`]: crate::server::router::build_router

use crate::config::GatewayConfig;
use crate::core::connection::Connection;
use crate::core::error::GatewayResult;
use crate::core::events::EventBus;
use crate::core::store::DocumentStore;
use crate::resources::{ResourceRegistry, ResourceRoutes, ResourceService};
use std::collections::HashMap;
use std::sync::Arc;

/// Host context containing all serving state
pub struct ServerHost {
    pub config: Arc<GatewayConfig>,

    /// The open store connection, reported by `/health`
    pub connection: Arc<Connection>,

    /// Route groups for every configured resource
    pub registry: ResourceRegistry,

    services: HashMap<String, Arc<ResourceService>>,

    pub event_bus: EventBus,
}

impl ServerHost {
    /// Bind every configured resource to the open store
    ///
    /// Fails with a configuration error when a resource view does not
    /// translate.
    pub fn from_components(
        config: Arc<GatewayConfig>,
        connection: Arc<Connection>,
        store: Arc<dyn DocumentStore>,
        event_bus: EventBus,
    ) -> GatewayResult<Self> {
        let mut registry = ResourceRegistry::new();
        let mut services = HashMap::with_capacity(config.resources.len());

        for resource in &config.resources {
            let service = Arc::new(ResourceService::new(
                resource.clone(),
                store.clone(),
                event_bus.clone(),
            )?);
            registry.register(Box::new(ResourceRoutes::new(service.clone())));
            services.insert(resource.name.clone(), service);
        }

        Ok(Self {
            config,
            connection,
            registry,
            services,
            event_bus,
        })
    }

    pub fn resource_names(&self) -> Vec<&str> {
        self.registry.resource_names()
    }

    /// Service behind a resource, for callers that bypass HTTP
    pub fn service(&self, name: &str) -> Option<Arc<ResourceService>> {
        self.services.get(name).cloned()
    }
}
