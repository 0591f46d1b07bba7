//! Internal event system
//!
//! The EventBus uses `tokio::sync::broadcast` to decouple the parts of the
//! gateway that change state (bootstrap, resource handlers) from anything that
//! wants to observe them (tests, log sinks, future push channels).
//!
//! # Architecture
//!
//! ```text
//! Bootstrap ─────────┐
//!                    ├──▶ EventBus::publish() ──▶ broadcast channel ──▶ subscribers
//! Resource handlers ─┘
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! let event_bus = EventBus::new(1024);
//! let mut rx = event_bus.subscribe();
//!
//! event_bus.publish(GatewayEvent::Lifecycle(LifecycleEvent::Seeded {
//!     collection: "users".to_string(),
//!     count: 10,
//! }));
//!
//! if let Ok(envelope) = rx.recv().await {
//!     println!("Received: {:?}", envelope.event);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

/// Startup and shutdown milestones
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum LifecycleEvent {
    /// The store session is open
    Opened { database: String },
    /// A collection was reset to its fixtures
    Seeded { collection: String, count: usize },
    /// The HTTP listener is accepting requests
    Serving { addr: String },
    /// Startup aborted
    Failed { reason: String },
}

/// Document mutations made through a resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DocumentEvent {
    Created {
        resource: String,
        key: serde_json::Value,
        data: serde_json::Value,
    },
    Updated {
        resource: String,
        key: serde_json::Value,
        data: serde_json::Value,
    },
    Deleted {
        resource: String,
        key: serde_json::Value,
    },
}

/// Top-level gateway event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatewayEvent {
    Lifecycle(LifecycleEvent),
    Document(DocumentEvent),
}

impl GatewayEvent {
    pub fn event_kind(&self) -> &str {
        match self {
            GatewayEvent::Lifecycle(_) => "lifecycle",
            GatewayEvent::Document(_) => "document",
        }
    }

    /// Resource the event relates to, for document events
    pub fn resource(&self) -> Option<&str> {
        match self {
            GatewayEvent::Document(
                DocumentEvent::Created { resource, .. }
                | DocumentEvent::Updated { resource, .. }
                | DocumentEvent::Deleted { resource, .. },
            ) => Some(resource),
            GatewayEvent::Lifecycle(_) => None,
        }
    }

    /// Short action name (`opened`, `seeded`, `created`, ...)
    pub fn action(&self) -> &str {
        match self {
            GatewayEvent::Lifecycle(e) => match e {
                LifecycleEvent::Opened { .. } => "opened",
                LifecycleEvent::Seeded { .. } => "seeded",
                LifecycleEvent::Serving { .. } => "serving",
                LifecycleEvent::Failed { .. } => "failed",
            },
            GatewayEvent::Document(e) => match e {
                DocumentEvent::Created { .. } => "created",
                DocumentEvent::Updated { .. } => "updated",
                DocumentEvent::Deleted { .. } => "deleted",
            },
        }
    }
}

/// Envelope wrapping an event with metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub id: Uuid,
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    pub event: GatewayEvent,
}

impl EventEnvelope {
    pub fn new(event: GatewayEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

/// Broadcast-based event bus
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<EventEnvelope>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity
    ///
    /// The capacity determines how many events can be buffered before
    /// slow receivers start losing events (lagged).
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publish an event to all subscribers
    ///
    /// Never fails. With no subscribers the event is dropped. Returns the
    /// number of receivers that will see it.
    pub fn publish(&self, event: GatewayEvent) -> usize {
        self.sender.send(EventEnvelope::new(event)).unwrap_or(0)
    }

    pub fn lifecycle(&self, event: LifecycleEvent) -> usize {
        self.publish(GatewayEvent::Lifecycle(event))
    }

    pub fn document(&self, event: DocumentEvent) -> usize {
        self.publish(GatewayEvent::Document(event))
    }

    /// Subscribe to events published from now on
    pub fn subscribe(&self) -> broadcast::Receiver<EventEnvelope> {
        self.sender.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(1024)
    }
}
