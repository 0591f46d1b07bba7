//! Server module: ordered startup and HTTP exposure
//!
//! - [`GatewayBuilder`] assembles a [`Gateway`] from configuration
//! - [`Gateway`] connects, seeds, then binds the listener, in that order
//! - [`ServerHost`] holds the serving state; [`build_router`] exposes it over REST

pub mod bootstrap;
pub mod builder;
pub mod host;
pub mod router;

pub use bootstrap::{BoundGateway, Gateway, Phase, shutdown_signal};
pub use builder::GatewayBuilder;
pub use host::ServerHost;
pub use router::build_router;
