//! Ordered startup
//!
//! A [`Gateway`] walks `Disconnected → Connecting → Open → Seeding → Serving`
//! in that order and never skips ahead: the listener is bound only after the
//! connection is open and every configured seed has completed, so no request
//! can observe a partially seeded collection. Any failure on the way moves the
//! gateway to `Failed` and is returned to the caller; nothing is retried.

use crate::config::GatewayConfig;
use crate::core::connection::Connection;
use crate::core::error::{GatewayError, GatewayResult};
use crate::core::events::{EventBus, LifecycleEvent};
use crate::core::seed::SeedLoader;
use crate::core::store::{Connector, DocumentStore};
use crate::server::host::ServerHost;
use crate::server::router::build_router;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::watch;

/// Startup phase of the gateway
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    Connecting,
    Open,
    Seeding,
    Serving,
    Failed,
}

/// A configured gateway that has not started yet
pub struct Gateway {
    config: Arc<GatewayConfig>,
    connection: Arc<Connection>,
    events: EventBus,
    phase: watch::Sender<Phase>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, connector: Arc<dyn Connector>, events: EventBus) -> Self {
        let connection = Arc::new(Connection::new(
            config.store.uri.clone(),
            config.store.database.clone(),
            connector,
        ));
        let (phase, _) = watch::channel(Phase::Disconnected);
        Self {
            config: Arc::new(config),
            connection,
            events,
            phase,
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn connection(&self) -> &Arc<Connection> {
        &self.connection
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn phase(&self) -> Phase {
        *self.phase.borrow()
    }

    /// Observe phase transitions
    pub fn subscribe_phase(&self) -> watch::Receiver<Phase> {
        self.phase.subscribe()
    }

    fn enter(&self, phase: Phase) {
        tracing::debug!(?phase, "entering phase");
        self.phase.send_replace(phase);
    }

    fn fail(&self, error: GatewayError) -> GatewayError {
        self.enter(Phase::Failed);
        tracing::error!(code = error.error_code(), error = %error, "startup aborted");
        self.events.lifecycle(LifecycleEvent::Failed {
            reason: error.to_string(),
        });
        error
    }

    async fn connect(&self) -> GatewayResult<Arc<dyn DocumentStore>> {
        self.enter(Phase::Connecting);
        let store = self.connection.open().await.map_err(|e| self.fail(e))?;

        self.enter(Phase::Open);
        self.events.lifecycle(LifecycleEvent::Opened {
            database: self.config.store.database.clone(),
        });
        Ok(store)
    }

    async fn seed(&self, store: Arc<dyn DocumentStore>) -> GatewayResult<usize> {
        if self.config.seed.is_empty() {
            return Ok(0);
        }

        self.enter(Phase::Seeding);
        let loader = SeedLoader::new(store);
        let mut total = 0;
        for seed in &self.config.seed {
            let count = loader
                .seed_from(&seed.collection, &seed.source)
                .await
                .map_err(|e| self.fail(e))?;
            self.events.lifecycle(LifecycleEvent::Seeded {
                collection: seed.collection.clone(),
                count,
            });
            total += count;
        }
        Ok(total)
    }

    /// Connect and seed, returning a host ready to serve
    pub async fn prepare(&self) -> GatewayResult<ServerHost> {
        let store = self.connect().await?;
        self.seed(store.clone()).await?;

        ServerHost::from_components(
            self.config.clone(),
            self.connection.clone(),
            store,
            self.events.clone(),
        )
        .map_err(|e| self.fail(e))
    }

    /// Connect, seed, then bind the listener
    pub async fn start(&self) -> GatewayResult<BoundGateway> {
        let host = self.prepare().await?;
        let router = build_router(&host);

        let addr = self.config.server.addr();
        let listener = TcpListener::bind(addr.as_str())
            .await
            .map_err(|e| self.fail(e.into()))?;
        let local_addr = listener.local_addr().map_err(|e| self.fail(e.into()))?;

        self.enter(Phase::Serving);
        tracing::info!(addr = %local_addr, resources = ?host.resource_names(), "serving");
        self.events.lifecycle(LifecycleEvent::Serving {
            addr: local_addr.to_string(),
        });

        Ok(BoundGateway {
            listener,
            router,
            local_addr,
            host,
        })
    }

    /// Start and serve until Ctrl+C or SIGTERM
    pub async fn run(&self) -> GatewayResult<()> {
        self.start().await?.serve(shutdown_signal()).await
    }

    /// Connect and seed, then stop without serving
    ///
    /// Returns the number of documents inserted across every seed.
    pub async fn seed_only(&self) -> GatewayResult<usize> {
        let started = Instant::now();
        let store = self.connect().await?;
        let total = self.seed(store).await?;
        tracing::info!(
            inserted = total,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "seeding finished"
        );
        Ok(total)
    }
}

/// A gateway whose listener is bound and accepting connections
pub struct BoundGateway {
    listener: TcpListener,
    router: Router,
    local_addr: SocketAddr,
    host: ServerHost,
}

impl BoundGateway {
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn host(&self) -> &ServerHost {
        &self.host
    }

    /// Serve requests until `shutdown` resolves
    pub async fn serve<F>(self, shutdown: F) -> GatewayResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

/// Resolve on Ctrl+C or SIGTERM
pub async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
