use std::sync::Arc;

use anyhow::Context;
use mdao_server::{AppContext, ServerConfig, init_tracing, routes};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let config = ServerConfig::from_env().context("invalid server configuration")?;
    init_tracing(config.log_level);

    match dotenv {
        Ok(path) => debug!(path = %path.display(), "loaded environment file"),
        Err(error) if error.not_found() => {}
        Err(error) => warn!(%error, "could not load environment file"),
    }

    let context = Arc::new(AppContext::init(&config).await);

    let (addr, server) = warp::serve(routes(Arc::clone(&context)))
        .try_bind_with_graceful_shutdown(config.addr(), async {
            if let Err(error) = tokio::signal::ctrl_c().await {
                tracing::error!(%error, "failed to listen for shutdown signal");
            }
        })
        .with_context(|| format!("failed to bind {}", config.addr()))?;

    info!(%addr, timeout_secs = config.solve_timeout.as_secs_f64(), "listening");
    server.await;
    info!("shutting down");

    // Routes hold the other handle and are dropped with the server.
    match Arc::try_unwrap(context) {
        Ok(context) => context.shutdown(),
        Err(_) => warn!("service client still in use at shutdown"),
    }

    Ok(())
}
