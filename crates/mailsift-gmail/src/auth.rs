//! Access-token providers for the Gmail API.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

use mailsift_core::{SiftError, SiftResult};

/// Tokens are refreshed this long before they expire.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Supplies bearer tokens for Gmail requests.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    /// Current access token.
    async fn access_token(&self) -> SiftResult<SecretString>;

    /// Drop any cached token after the provider rejected it.
    async fn invalidate(&self) {}
}

/// A fixed, externally managed access token.
pub struct StaticTokenProvider {
    token: SecretString,
}

impl StaticTokenProvider {
    pub fn new(token: SecretString) -> Self {
        Self { token }
    }
}

#[async_trait]
impl TokenProvider for StaticTokenProvider {
    async fn access_token(&self) -> SiftResult<SecretString> {
        Ok(self.token.clone())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
}

struct CachedToken {
    token: SecretString,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// OAuth2 refresh-token grant with an in-memory token cache.
pub struct RefreshTokenProvider {
    client: Client,
    token_url: String,
    client_id: String,
    client_secret: SecretString,
    refresh_token: SecretString,
    cached: RwLock<Option<CachedToken>>,
}

impl RefreshTokenProvider {
    pub fn new(
        client: Client,
        token_url: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: SecretString,
        refresh_token: SecretString,
    ) -> Self {
        Self {
            client,
            token_url: token_url.into(),
            client_id: client_id.into(),
            client_secret,
            refresh_token,
            cached: RwLock::new(None),
        }
    }

    async fn refresh(&self) -> SiftResult<CachedToken> {
        debug!(token_url = %self.token_url, "Refreshing Gmail access token");

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.expose_secret().as_str()),
            ("refresh_token", self.refresh_token.expose_secret().as_str()),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| SiftError::Authentication {
                message: format!("Token endpoint unreachable: {}", e),
                code: mailsift_core::ErrorCode::AuthExpiredToken,
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SiftError::authentication(format!(
                "Token refresh rejected ({}): {}",
                status, body
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            SiftError::transport_with_source(
                "Failed to read token response",
                mailsift_core::ErrorCode::NetConnectionFailed,
                e,
            )
        })?;
        let token: TokenResponse = serde_json::from_slice(&body)
            .map_err(|e| SiftError::parse(format!("Invalid token response: {}", e)))?;

        Ok(CachedToken {
            token: SecretString::new(token.access_token),
            expires_at: Utc::now() + Duration::seconds(token.expires_in.unwrap_or(3600)),
        })
    }
}

#[async_trait]
impl TokenProvider for RefreshTokenProvider {
    async fn access_token(&self) -> SiftResult<SecretString> {
        if let Some(cached) = self.cached.read().await.as_ref() {
            if cached.is_fresh() {
                return Ok(cached.token.clone());
            }
        }

        let mut cached = self.cached.write().await;
        // Another caller may have refreshed while we waited for the lock.
        if let Some(current) = cached.as_ref() {
            if current.is_fresh() {
                return Ok(current.token.clone());
            }
        }

        let fresh = self.refresh().await?;
        let token = fresh.token.clone();
        *cached = Some(fresh);
        Ok(token)
    }

    async fn invalidate(&self) {
        *self.cached.write().await = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn provider(server: &mockito::Server) -> RefreshTokenProvider {
        RefreshTokenProvider::new(
            Client::new(),
            format!("{}/token", server.url()),
            "client-id",
            SecretString::new("client-secret".to_string()),
            SecretString::new("refresh-token".to_string()),
        )
    }

    #[tokio::test]
    async fn test_static_provider() {
        let provider = StaticTokenProvider::new(SecretString::new("fixed".to_string()));
        let token = provider.access_token().await.unwrap();
        assert_eq!(token.expose_secret(), "fixed");
    }

    #[tokio::test]
    async fn test_refresh_token_is_cached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "refresh-token".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token": "fresh", "expires_in": 3600, "token_type": "Bearer"}"#)
            .expect(1)
            .create_async()
            .await;

        let provider = provider(&server);
        assert_eq!(provider.access_token().await.unwrap().expose_secret(), "fresh");
        assert_eq!(provider.access_token().await.unwrap().expose_secret(), "fresh");

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_invalidate_forces_refresh() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/token")
            .with_status(200)
            .with_body(r#"{"access_token": "fresh", "expires_in": 3600}"#)
            .expect(2)
            .create_async()
            .await;

        let provider = provider(&server);
        provider.access_token().await.unwrap();
        provider.invalidate().await;
        provider.access_token().await.unwrap();

        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_refresh_is_authentication_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/token")
            .with_status(400)
            .with_body(r#"{"error": "invalid_grant"}"#)
            .create_async()
            .await;

        let err = provider(&server).access_token().await.unwrap_err();
        assert!(matches!(err, SiftError::Authentication { .. }));
    }
}
