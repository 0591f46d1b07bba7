//! Connection lifecycle
//!
//! A [`Connection`] owns the single session to the document store. It moves
//! through `Disconnected → Connecting → Open | Failed` exactly once: the first
//! call to [`Connection::open`] performs the connect, and every concurrent or
//! later caller observes that same outcome. A failed open is terminal; nothing
//! reconnects behind the caller's back.
//!
//! Readiness is published on a `tokio::sync::watch` channel so dependents can
//! wait for `Open` without polling.

use crate::core::error::{GatewayError, GatewayResult};
use crate::core::store::{Connector, DocumentStore};
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{OnceCell, watch};

/// Lifecycle state of the store connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Open,
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Open => "open",
            ConnectionState::Failed => "failed",
        };
        f.write_str(name)
    }
}

type OpenOutcome = Result<Arc<dyn DocumentStore>, Arc<anyhow::Error>>;

/// The process-wide store connection
pub struct Connection {
    uri: String,
    database: String,
    connector: Arc<dyn Connector>,
    outcome: OnceCell<OpenOutcome>,
    state: watch::Sender<ConnectionState>,
}

impl Connection {
    /// Create a connection in the `Disconnected` state; nothing is dialed yet
    pub fn new(
        uri: impl Into<String>,
        database: impl Into<String>,
        connector: Arc<dyn Connector>,
    ) -> Self {
        let (state, _) = watch::channel(ConnectionState::Disconnected);
        Self {
            uri: uri.into(),
            database: database.into(),
            connector,
            outcome: OnceCell::new(),
            state,
        }
    }

    pub fn database(&self) -> &str {
        &self.database
    }

    /// Current lifecycle state
    pub fn state(&self) -> ConnectionState {
        *self.state.borrow()
    }

    /// Receive every subsequent state change
    pub fn subscribe(&self) -> watch::Receiver<ConnectionState> {
        self.state.subscribe()
    }

    /// Open the session, or return the outcome of the open already performed
    pub async fn open(&self) -> GatewayResult<Arc<dyn DocumentStore>> {
        let outcome = self
            .outcome
            .get_or_init(|| async {
                self.state.send_replace(ConnectionState::Connecting);
                tracing::info!(database = %self.database, "connecting to document store");

                match self.connector.connect(&self.uri, &self.database).await {
                    Ok(store) => {
                        self.state.send_replace(ConnectionState::Open);
                        tracing::info!(database = %self.database, "connected to document store");
                        Ok(store)
                    }
                    Err(e) => {
                        self.state.send_replace(ConnectionState::Failed);
                        tracing::error!(database = %self.database, error = %e, "connection failed");
                        Err(Arc::new(e))
                    }
                }
            })
            .await;

        match outcome {
            Ok(store) => Ok(store.clone()),
            Err(e) => Err(GatewayError::Connection {
                database: self.database.clone(),
                source: format!("{e:#}").into(),
            }),
        }
    }

    /// The store handle, only once the connection is `Open`
    pub fn store(&self) -> Option<Arc<dyn DocumentStore>> {
        match self.outcome.get() {
            Some(Ok(store)) => Some(store.clone()),
            _ => None,
        }
    }

    /// Wait until the connection leaves `Disconnected`/`Connecting`
    ///
    /// Returns the settled state (`Open` or `Failed`).
    pub async fn settled(&self) -> ConnectionState {
        let mut rx = self.subscribe();
        let result = rx
            .wait_for(|state| matches!(state, ConnectionState::Open | ConnectionState::Failed))
            .await
            .map(|state| *state);
        result.unwrap_or_else(|_| self.state())
    }
}

impl fmt::Debug for Connection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connection")
            .field("database", &self.database)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
