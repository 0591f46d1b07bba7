//! `docgate [serve|seed] [config-path]`
//!
//! `serve` (the default) connects, seeds and serves until Ctrl+C or SIGTERM.
//! `seed` connects, seeds and exits. The configuration path defaults to
//! `$DOCGATE_CONFIG`, then `docgate.yaml`.

use anyhow::{Context, Result, bail};
use docgate::config::GatewayConfig;
use docgate::server::GatewayBuilder;
use tracing_subscriber::EnvFilter;

enum Command {
    Serve,
    Seed,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let mut args = std::env::args().skip(1).peekable();
    let first = args.peek().cloned();
    let command = match first.as_deref() {
        Some("serve") => {
            args.next();
            Command::Serve
        }
        Some("seed") => {
            args.next();
            Command::Seed
        }
        Some(flag) if flag.starts_with('-') => bail!("unknown option {flag}"),
        _ => Command::Serve,
    };

    let path = args
        .next()
        .or_else(|| std::env::var("DOCGATE_CONFIG").ok())
        .unwrap_or_else(|| "docgate.yaml".to_string());

    let config =
        GatewayConfig::load(&path).with_context(|| format!("loading configuration from {path}"))?;
    let gateway = GatewayBuilder::new(config).build()?;

    match command {
        Command::Serve => gateway.run().await?,
        Command::Seed => {
            gateway.seed_only().await?;
        }
    }

    Ok(())
}
