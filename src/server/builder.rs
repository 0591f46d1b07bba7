//! GatewayBuilder for a fluent API to assemble a gateway

use super::bootstrap::Gateway;
use crate::config::{BackendKind, GatewayConfig};
use crate::core::error::GatewayResult;
use crate::core::events::EventBus;
use crate::core::store::Connector;
use crate::storage::InMemoryConnector;
use std::sync::Arc;

/// Builder for creating a [`Gateway`] from configuration
///
/// # Example
///
/// ```ignore
/// let config = GatewayConfig::load("docgate.yaml")?;
/// GatewayBuilder::new(config)
///     .with_event_bus(EventBus::new(1024))
///     .build()?
///     .run()
///     .await?;
/// ```
pub struct GatewayBuilder {
    config: GatewayConfig,
    connector: Option<Arc<dyn Connector>>,
    event_bus: Option<EventBus>,
}

impl GatewayBuilder {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            config,
            connector: None,
            event_bus: None,
        }
    }

    /// Use a specific connector instead of the one `store.backend` selects
    pub fn with_connector(mut self, connector: impl Connector + 'static) -> Self {
        self.connector = Some(Arc::new(connector));
        self
    }

    /// Publish lifecycle and document events on this bus
    pub fn with_event_bus(mut self, event_bus: EventBus) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    /// Validate the configuration and assemble the gateway
    pub fn build(self) -> GatewayResult<Gateway> {
        self.config.check()?;

        let connector = match self.connector {
            Some(connector) => connector,
            None => connector_for(self.config.store.backend)?,
        };

        Ok(Gateway::new(
            self.config,
            connector,
            self.event_bus.unwrap_or_default(),
        ))
    }
}

/// Connector for the configured backend
fn connector_for(backend: BackendKind) -> GatewayResult<Arc<dyn Connector>> {
    match backend {
        BackendKind::InMemory => Ok(Arc::new(InMemoryConnector::new())),
        #[cfg(feature = "mongodb_backend")]
        BackendKind::MongoDb => Ok(Arc::new(crate::storage::MongoConnector::new())),
        #[cfg(not(feature = "mongodb_backend"))]
        BackendKind::MongoDb => Err(crate::core::error::GatewayError::Config(
            "the mongodb backend requires the `mongodb_backend` feature".to_string(),
        )),
    }
}
