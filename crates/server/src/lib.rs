//! HTTP transport for declarative optimization problems.
//!
//! [`ServerConfig`] is read from the environment at startup. [`AppContext`]
//! owns the optional authenticated [`ServiceClient`] for the life of the
//! process, and [`routes`] exposes `POST /solve` and `GET /health`.

pub mod auth;
pub mod client;
pub mod config;
pub mod routes;

pub use auth::{AuthError, fetch_token, token_url};
pub use client::{AppContext, ClientError, ServiceClient};
pub use config::{AuthConfig, ConfigError, LogLevel, ServerConfig};
pub use routes::routes;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Installs the global `tracing` subscriber.
///
/// `RUST_LOG` takes precedence over `level` when set.
pub fn init_tracing(level: LogLevel) {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(level.as_filter_str())),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
