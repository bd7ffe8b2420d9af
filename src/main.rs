//! hubstats service entry point.
//!
//! Wires configuration, the GitHub gateway, and the analyzer together, then
//! serves the HTTP API until interrupted.

use std::sync::Arc;

use anyhow::Context;
use tokio::runtime::Runtime;
use tokio_util::sync::CancellationToken;

use hubstats::analysis::Analyzer;
use hubstats::config::Config;
use hubstats::github::GithubGateway;
use hubstats::server;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    let runtime = Runtime::new().context("failed to start async runtime")?;

    let gateway =
        Arc::new(GithubGateway::new(&config).context("failed to build GitHub client")?);
    let analyzer = Arc::new(Analyzer::new(gateway));

    // SIGINT stops the accept loop and cancels in-flight analyses.
    let shutdown = CancellationToken::new();
    {
        let shutdown = shutdown.clone();
        runtime.spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
                shutdown.cancel();
            }
        });
    }

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "hubstats starting");
    server::serve(config.port, analyzer, runtime.handle().clone(), shutdown)
}
