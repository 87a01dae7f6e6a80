//! Environment-driven server configuration.
//!
//! | Variable | Default |
//! |---|---|
//! | `MDAO_HOST` | `127.0.0.1` |
//! | `MDAO_PORT` | `3030` |
//! | `MDAO_LOG_LEVEL` | `info` |
//! | `MDAO_SOLVE_TIMEOUT_SECS` | `30` |
//! | `AUTH_PROVIDER` | unset, which disables the service client |
//! | `AUTH_DOMAIN`, `AUTH_CLIENT_ID`, `AUTH_SECRET`, `AUTH_IDENTIFIER` | needed with a provider; if any is missing the client is disabled |
//! | `SERVICE_ENDPOINT_URL` | unset; `MAANA_ENDPOINT_URL` is read as a fallback |

use std::{
    fmt,
    net::{IpAddr, Ipv4Addr, SocketAddr},
    str::FromStr,
    time::Duration,
};

use thiserror::Error;

/// Names checked, in order, for the service endpoint.
const ENDPOINT_VARS: [&str; 2] = ["SERVICE_ENDPOINT_URL", "MAANA_ENDPOINT_URL"];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid host `{0}`: expected an IP address")]
    InvalidHost(String),

    #[error("invalid port `{0}`: must be between 1 and 65535")]
    InvalidPort(String),

    #[error("invalid log level `{0}`: must be one of trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("invalid solve timeout `{0}`: must be a positive number of seconds")]
    InvalidTimeout(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(Self::Trace),
            "debug" => Ok(Self::Debug),
            "info" => Ok(Self::Info),
            "warn" => Ok(Self::Warn),
            "error" => Ok(Self::Error),
            _ => Err(ConfigError::InvalidLogLevel(s.to_string())),
        }
    }
}

impl LogLevel {
    /// Returns the directive understood by `tracing_subscriber::EnvFilter`.
    #[must_use]
    pub fn as_filter_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_filter_str())
    }
}

/// Credentials for the client-credentials token exchange.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthConfig {
    pub provider: String,
    pub domain: String,
    pub client_id: String,
    pub secret: String,
    /// Audience for generic providers, realm for Keycloak.
    pub identifier: String,
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("provider", &self.provider)
            .field("domain", &self.domain)
            .field("client_id", &self.client_id)
            .field("secret", &"<redacted>")
            .field("identifier", &self.identifier)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
    pub log_level: LogLevel,
    pub solve_timeout: Duration,
    /// `None` when no auth provider is configured or its settings are incomplete.
    pub auth: Option<AuthConfig>,
    /// Auth variables a configured provider was missing.
    pub missing_auth_vars: Vec<&'static str>,
    pub service_endpoint: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 3030,
            log_level: LogLevel::Info,
            solve_timeout: Duration::from_secs(30),
            auth: None,
            missing_auth_vars: Vec::new(),
            service_endpoint: None,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if a server variable is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Loads configuration from an arbitrary variable source.
    ///
    /// Empty values are treated as unset. Incomplete auth settings leave
    /// `auth` unset and are listed in `missing_auth_vars` instead of failing.
    ///
    /// # Errors
    ///
    /// See [`ServerConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        let mut config = Self::default();

        if let Some(host) = var("MDAO_HOST") {
            config.host = host
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidHost(host))?;
        }

        if let Some(port) = var("MDAO_PORT") {
            config.port = port
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidPort(port))?;
        }

        if let Some(level) = var("MDAO_LOG_LEVEL") {
            config.log_level = level.parse()?;
        }

        if let Some(secs) = var("MDAO_SOLVE_TIMEOUT_SECS") {
            let parsed: f64 = secs
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidTimeout(secs.clone()))?;
            config.solve_timeout =
                Duration::try_from_secs_f64(parsed).map_err(|_| ConfigError::InvalidTimeout(secs))?;
        }

        if let Some(provider) = var("AUTH_PROVIDER") {
            match auth_config(provider.trim(), &var) {
                Ok(auth) => config.auth = Some(auth),
                Err(missing) => config.missing_auth_vars = missing,
            }
        }

        config.service_endpoint = ENDPOINT_VARS.iter().find_map(|&key| var(key));

        config.validate()?;
        Ok(config)
    }

    /// Checks values that parse but cannot be served.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidPort`] for port 0 and
    /// [`ConfigError::InvalidTimeout`] for a zero timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.port == 0 {
            return Err(ConfigError::InvalidPort(self.port.to_string()));
        }
        if self.solve_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(format!(
                "{}",
                self.solve_timeout.as_secs_f64()
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn auth_config(
    provider: &str,
    var: &impl Fn(&str) -> Option<String>,
) -> Result<AuthConfig, Vec<&'static str>> {
    let mut missing = Vec::new();
    let mut take = |key: &'static str| {
        var(key).unwrap_or_else(|| {
            missing.push(key);
            String::new()
        })
    };

    let auth = AuthConfig {
        provider: provider.to_string(),
        domain: take("AUTH_DOMAIN"),
        client_id: take("AUTH_CLIENT_ID"),
        secret: take("AUTH_SECRET"),
        identifier: take("AUTH_IDENTIFIER"),
    };

    if missing.is_empty() {
        Ok(auth)
    } else {
        Err(missing)
    }
}
