//! Client-credentials token exchange.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::AuthConfig;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("token endpoint `{url}` responded with {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    #[error("token response has an empty `access_token`")]
    EmptyToken,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Returns the token endpoint for the configured provider.
///
/// Keycloak domains include their scheme and use the identifier as the
/// realm. Any other provider is treated as an OAuth host reached over HTTPS.
#[must_use]
pub fn token_url(config: &AuthConfig) -> String {
    if config.provider.eq_ignore_ascii_case("keycloak") {
        format!(
            "{}/auth/realms/{}/protocol/openid-connect/token",
            config.domain.trim_end_matches('/'),
            config.identifier
        )
    } else {
        format!("https://{}/oauth/token", config.domain.trim_end_matches('/'))
    }
}

/// Exchanges the client credentials for a bearer token.
///
/// # Errors
///
/// Returns an [`AuthError`] if the request fails, the endpoint responds
/// with a non-success status, or the response carries no token.
pub async fn fetch_token(http: &reqwest::Client, config: &AuthConfig) -> Result<String, AuthError> {
    let url = token_url(config);
    debug!(%url, provider = %config.provider, "requesting access token");

    let form = [
        ("grant_type", "client_credentials"),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.secret.as_str()),
        ("audience", config.identifier.as_str()),
    ];

    let response = http.post(&url).form(&form).send().await?;
    if !response.status().is_success() {
        return Err(AuthError::Status {
            url,
            status: response.status(),
        });
    }

    let TokenResponse { access_token } = response.json().await?;
    if access_token.is_empty() {
        return Err(AuthError::EmptyToken);
    }

    debug!("received access token");
    Ok(access_token)
}

#[cfg(test)]
mod tests {
    use std::{collections::HashMap, net::SocketAddr};

    use warp::Filter;

    use super::*;

    fn config(provider: &str, domain: &str) -> AuthConfig {
        AuthConfig {
            provider: provider.into(),
            domain: domain.into(),
            client_id: "client".into(),
            secret: "secret".into(),
            identifier: "mdao".into(),
        }
    }

    /// Serves a Keycloak-shaped token endpoint that checks the form fields.
    fn spawn_token_server() -> SocketAddr {
        let token = warp::post()
            .and(warp::path!(
                "auth" / "realms" / String / "protocol" / "openid-connect" / "token"
            ))
            .and(warp::body::form())
            .map(|realm: String, form: HashMap<String, String>| {
                let valid = realm == "mdao"
                    && form.get("grant_type").map(String::as_str) == Some("client_credentials")
                    && form.get("client_id").map(String::as_str) == Some("client")
                    && form.get("client_secret").map(String::as_str) == Some("secret")
                    && form.get("audience").map(String::as_str) == Some("mdao");
                if valid {
                    warp::reply::with_status(
                        warp::reply::json(&serde_json::json!({ "access_token": "abc123" })),
                        warp::http::StatusCode::OK,
                    )
                } else {
                    warp::reply::with_status(
                        warp::reply::json(&serde_json::json!({ "error": "invalid_client" })),
                        warp::http::StatusCode::UNAUTHORIZED,
                    )
                }
            });

        let (addr, server) = warp::serve(token).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);
        addr
    }

    #[test]
    fn keycloak_url_uses_realm() {
        assert_eq!(
            token_url(&config("keycloak", "https://id.example.com/")),
            "https://id.example.com/auth/realms/mdao/protocol/openid-connect/token"
        );
    }

    #[test]
    fn other_providers_use_oauth_host() {
        assert_eq!(
            token_url(&config("auth0", "tenant.auth0.com")),
            "https://tenant.auth0.com/oauth/token"
        );
    }

    #[tokio::test]
    async fn exchanges_credentials_for_token() {
        let addr = spawn_token_server();
        let auth = config("keycloak", &format!("http://{addr}"));

        let token = fetch_token(&reqwest::Client::new(), &auth).await.unwrap();
        assert_eq!(token, "abc123");
    }

    #[tokio::test]
    async fn rejected_credentials_are_errors() {
        let addr = spawn_token_server();
        let mut auth = config("keycloak", &format!("http://{addr}"));
        auth.secret = "wrong".into();

        let err = fetch_token(&reqwest::Client::new(), &auth)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            AuthError::Status { status, .. } if status == reqwest::StatusCode::UNAUTHORIZED
        ));
    }
}
