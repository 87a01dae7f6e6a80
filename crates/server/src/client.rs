//! The authenticated service client and the context that owns it.

use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    auth::{AuthError, fetch_token},
    config::{AuthConfig, ServerConfig},
};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("service responded with {0}")]
    Status(reqwest::StatusCode),

    #[error("service returned errors: {0}")]
    Service(Value),
}

#[derive(Serialize)]
struct QueryBody<'a> {
    query: &'a str,
    variables: &'a Value,
}

/// A GraphQL client that sends a bearer token with every request.
#[derive(Debug, Clone)]
pub struct ServiceClient {
    http: reqwest::Client,
    endpoint: String,
    token: String,
}

impl ServiceClient {
    #[must_use]
    pub fn new(http: reqwest::Client, endpoint: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            token: token.into(),
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Executes a query and returns its `data` member.
    ///
    /// # Errors
    ///
    /// Returns a [`ClientError`] if the request fails, the endpoint responds
    /// with a non-success status, or the response carries GraphQL errors.
    pub async fn query(&self, query: &str, variables: &Value) -> Result<Value, ClientError> {
        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.token)
            .json(&QueryBody { query, variables })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ClientError::Status(response.status()));
        }

        let mut body: Value = response.json().await?;
        if let Some(errors) = body.get("errors").filter(|e| !e.is_null()) {
            return Err(ClientError::Service(errors.clone()));
        }
        Ok(body.get_mut("data").map(Value::take).unwrap_or(Value::Null))
    }
}

#[derive(Debug, Error)]
enum SetupError {
    #[error("no service endpoint configured")]
    MissingEndpoint,

    #[error("could not build HTTP client: {0}")]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Shared state created once at startup and handed to request handlers.
///
/// Holds the service client when one could be set up. Missing or incomplete
/// auth settings, a missing endpoint and a failed token exchange all leave the
/// client unset rather than failing startup.
#[derive(Debug)]
pub struct AppContext {
    client: Option<ServiceClient>,
    solve_timeout: Duration,
}

impl AppContext {
    /// Builds the context, exchanging credentials for a token if auth is
    /// configured.
    pub async fn init(config: &ServerConfig) -> Self {
        let client = match &config.auth {
            None if !config.missing_auth_vars.is_empty() => {
                warn!(
                    missing = %config.missing_auth_vars.join(", "),
                    "incomplete auth settings, service client disabled"
                );
                None
            }
            None => {
                info!("auth provider not set, service client disabled");
                None
            }
            Some(auth) => match setup_client(config, auth).await {
                Ok(client) => {
                    info!(endpoint = %client.endpoint(), "service client ready");
                    Some(client)
                }
                Err(error) => {
                    warn!(%error, "abandoning service client setup");
                    None
                }
            },
        };

        Self {
            client,
            solve_timeout: config.solve_timeout,
        }
    }

    /// A context with no service client.
    #[must_use]
    pub fn without_client(solve_timeout: Duration) -> Self {
        Self {
            client: None,
            solve_timeout,
        }
    }

    #[must_use]
    pub fn client(&self) -> Option<&ServiceClient> {
        self.client.as_ref()
    }

    #[must_use]
    pub fn solve_timeout(&self) -> Duration {
        self.solve_timeout
    }

    /// Releases the service client.
    pub fn shutdown(self) {
        if self.client.is_some() {
            info!("service client released");
        }
    }
}

async fn setup_client(
    config: &ServerConfig,
    auth: &AuthConfig,
) -> Result<ServiceClient, SetupError> {
    let endpoint = config
        .service_endpoint
        .clone()
        .ok_or(SetupError::MissingEndpoint)?;
    let http = reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build()?;
    let token = fetch_token(&http, auth).await?;
    Ok(ServiceClient::new(http, endpoint, token))
}
