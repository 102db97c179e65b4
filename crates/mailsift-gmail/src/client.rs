//! Gmail implementation of the mailbox port.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::{Client, StatusCode};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

use mailsift_core::{
    AttachmentDescriptor, ErrorCode, GmailConfig, LabelRef, Mailbox, RetryPolicy, SiftError,
    SiftResult,
};

use crate::api::{
    decode_attachment_data, ListLabelsResponse, ListMessagesResponse, Message, MessagePartBody,
};
use crate::auth::{RefreshTokenProvider, StaticTokenProvider, TokenProvider};

/// Mailbox backed by the Gmail REST API.
pub struct GmailMailbox {
    client: Client,
    base_url: Url,
    user_id: String,
    tokens: Arc<dyn TokenProvider>,
    retry: RetryPolicy,
}

impl GmailMailbox {
    /// Create a mailbox with an explicit token provider.
    pub fn new(config: &GmailConfig, tokens: Arc<dyn TokenProvider>) -> SiftResult<Self> {
        let client = build_client(config)?;
        Self::with_client(client, config, tokens)
    }

    /// Create a mailbox, choosing the token provider from the configured credentials.
    ///
    /// A fixed access token wins over refresh credentials.
    pub fn from_config(config: &GmailConfig) -> SiftResult<Self> {
        let client = build_client(config)?;

        let tokens: Arc<dyn TokenProvider> = match (
            &config.access_token,
            &config.client_id,
            &config.client_secret,
            &config.refresh_token,
        ) {
            (Some(token), _, _, _) => Arc::new(StaticTokenProvider::new(token.clone())),
            (None, Some(client_id), Some(client_secret), Some(refresh_token)) => {
                Arc::new(RefreshTokenProvider::new(
                    client.clone(),
                    config.token_url.clone(),
                    client_id.clone(),
                    client_secret.clone(),
                    refresh_token.clone(),
                ))
            }
            _ => {
                return Err(SiftError::missing_credentials(
                    "Set GMAIL_ACCESS_TOKEN, or GMAIL_CLIENT_ID with GMAIL_CLIENT_SECRET and GMAIL_REFRESH_TOKEN",
                ))
            }
        };

        Self::with_client(client, config, tokens)
    }

    fn with_client(
        client: Client,
        config: &GmailConfig,
        tokens: Arc<dyn TokenProvider>,
    ) -> SiftResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SiftError::Configuration(format!("Invalid Gmail base URL '{}': {}", config.base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(SiftError::Configuration(format!(
                "Gmail base URL '{}' cannot carry a path",
                config.base_url
            )));
        }

        Ok(Self {
            client,
            base_url,
            user_id: config.user_id.clone(),
            tokens,
            retry: config.retry.clone(),
        })
    }

    /// `{base}/gmail/v1/users/{user}/{segments...}`
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .extend(["gmail", "v1", "users", self.user_id.as_str()])
                .extend(segments);
        }
        url
    }

    fn backoff(&self) -> ExponentialBuilder {
        ExponentialBuilder::default()
            .with_max_times(self.retry.max_retries as usize)
            .with_min_delay(Duration::from_millis(self.retry.initial_delay_ms))
            .with_max_delay(Duration::from_millis(self.retry.max_delay_ms))
            .with_factor(self.retry.multiplier)
    }

    /// GET a JSON resource, retrying transient failures.
    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> SiftResult<T> {
        let attempt = || async { self.fetch_once::<T>(url.clone()).await };

        attempt
            .retry(self.backoff())
            .when(SiftError::is_transient)
            .notify(|err, dur| {
                warn!(
                    "Gmail request to {} failed, retrying in {:?}: {}",
                    url.path(),
                    dur,
                    err
                );
            })
            .await
    }

    async fn fetch_once<T: DeserializeOwned>(&self, url: Url) -> SiftResult<T> {
        let token = self.tokens.access_token().await?;

        let response = self
            .client
            .get(url)
            .bearer_auth(token.expose_secret())
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = response
                .headers()
                .get(reqwest::header::RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok());
            let body = response.text().await.unwrap_or_default();

            if status == StatusCode::UNAUTHORIZED {
                self.tokens.invalidate().await;
            }

            let mut err = SiftError::from_http_status(status.as_u16(), &body);
            if let SiftError::RateLimit {
                retry_after: slot, ..
            } = &mut err
            {
                *slot = retry_after;
            }
            return Err(err);
        }

        let body = response.bytes().await.map_err(map_request_error)?;
        serde_json::from_slice(&body)
            .map_err(|e| SiftError::parse(format!("Unexpected Gmail response: {}", e)))
    }

    async fn list_message_ids(&self, query: &[(&str, &str)]) -> SiftResult<Vec<String>> {
        let mut url = self.endpoint(&["messages"]);
        url.query_pairs_mut().extend_pairs(query);

        let response: ListMessagesResponse = self.get_json(url).await?;
        let ids: Vec<String> = response.messages.into_iter().map(|m| m.id).collect();
        debug!(count = ids.len(), "Listed Gmail messages");
        Ok(ids)
    }

    async fn get_message(&self, message_id: &str, format: &str) -> SiftResult<Message> {
        let mut url = self.endpoint(&["messages", message_id]);
        url.query_pairs_mut().append_pair("format", format);
        self.get_json(url).await
    }
}

fn build_client(config: &GmailConfig) -> SiftResult<Client> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()
        .map_err(|e| SiftError::Configuration(format!("Failed to build HTTP client: {}", e)))
}

fn map_request_error(e: reqwest::Error) -> SiftError {
    let code = if e.is_timeout() {
        ErrorCode::NetTimeout
    } else {
        ErrorCode::NetConnectionFailed
    };
    SiftError::transport_with_source(format!("Gmail request failed: {}", e), code, e)
}

#[async_trait]
impl Mailbox for GmailMailbox {
    async fn list_recent_message_ids(&self, max_results: u32) -> SiftResult<Vec<String>> {
        let max = max_results.to_string();
        self.list_message_ids(&[("maxResults", max.as_str())]).await
    }

    async fn attachment_descriptors(
        &self,
        message_id: &str,
    ) -> SiftResult<Vec<AttachmentDescriptor>> {
        let message = self.get_message(message_id, "full").await?;
        Ok(message.attachment_descriptors())
    }

    async fn attachment_bytes(
        &self,
        message_id: &str,
        attachment_handle: &str,
    ) -> SiftResult<Vec<u8>> {
        let url = self.endpoint(&["messages", message_id, "attachments", attachment_handle]);
        let body: MessagePartBody = self.get_json(url).await?;

        let data = body
            .data
            .ok_or_else(|| SiftError::parse("Attachment response carries no data"))?;
        decode_attachment_data(&data)
    }

    async fn list_labels(&self) -> SiftResult<Vec<LabelRef>> {
        let response: ListLabelsResponse = self.get_json(self.endpoint(&["labels"])).await?;
        Ok(response.labels.into_iter().map(LabelRef::from).collect())
    }

    async fn list_message_ids_by_label(
        &self,
        label_id: &str,
        max_results: u32,
    ) -> SiftResult<Vec<String>> {
        let max = max_results.to_string();
        self.list_message_ids(&[("labelIds", label_id), ("maxResults", max.as_str())])
            .await
    }

    async fn search_message_ids_by_subject(
        &self,
        subject: &str,
        max_results: u32,
    ) -> SiftResult<Vec<String>> {
        let query = format!("subject:\"{}\"", subject.replace('"', ""));
        let max = max_results.to_string();
        self.list_message_ids(&[("q", query.as_str()), ("maxResults", max.as_str())])
            .await
    }

    async fn message_timestamp(&self, message_id: &str) -> SiftResult<Option<i64>> {
        let message = self.get_message(message_id, "minimal").await?;
        Ok(message.internal_timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use secrecy::SecretString;

    fn config(server: &mockito::Server) -> GmailConfig {
        GmailConfig {
            base_url: server.url(),
            access_token: Some(SecretString::new("test-token".to_string())),
            retry: RetryPolicy {
                max_retries: 2,
                initial_delay_ms: 1,
                max_delay_ms: 5,
                multiplier: 2.0,
            },
            ..Default::default()
        }
    }

    fn mailbox(server: &mockito::Server) -> GmailMailbox {
        GmailMailbox::from_config(&config(server)).unwrap()
    }

    #[tokio::test]
    async fn test_list_recent_message_ids() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/gmail/v1/users/me/messages")
            .match_query(Matcher::UrlEncoded("maxResults".into(), "5".into()))
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"messages": [{"id": "a", "threadId": "t"}, {"id": "b", "threadId": "t"}], "resultSizeEstimate": 2}"#,
            )
            .create_async()
            .await;

        let ids = mailbox(&server).list_recent_message_ids(5).await.unwrap();

        assert_eq!(ids, vec!["a", "b"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_empty_listing_has_no_messages_field() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gmail/v1/users/me/messages")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body(r#"{"resultSizeEstimate": 0}"#)
            .create_async()
            .await;

        let ids = mailbox(&server).list_recent_message_ids(5).await.unwrap();

        assert!(ids.is_empty());
    }

    #[tokio::test]
    async fn test_subject_search_query() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/gmail/v1/users/me/messages")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("q".into(), "subject:\"Quarterly report\"".into()),
                Matcher::UrlEncoded("maxResults".into(), "10".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"messages": [{"id": "x"}]}"#)
            .create_async()
            .await;

        let ids = mailbox(&server)
            .search_message_ids_by_subject("Quarterly report", 10)
            .await
            .unwrap();

        assert_eq!(ids, vec!["x"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_list_by_label_passes_label_id() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/gmail/v1/users/me/messages")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("labelIds".into(), "Label_9".into()),
                Matcher::UrlEncoded("maxResults".into(), "3".into()),
            ]))
            .with_status(200)
            .with_body(r#"{"messages": [{"id": "m1"}]}"#)
            .create_async()
            .await;

        let ids = mailbox(&server)
            .list_message_ids_by_label("Label_9", 3)
            .await
            .unwrap();

        assert_eq!(ids, vec!["m1"]);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_attachment_descriptors_and_bytes() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gmail/v1/users/me/messages/m1")
            .match_query(Matcher::UrlEncoded("format".into(), "full".into()))
            .with_status(200)
            .with_body(
                r#"{"id": "m1", "payload": {"filename": "", "parts": [
                    {"filename": "notes.txt", "body": {"attachmentId": "att-1", "size": 5}}
                ]}}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/gmail/v1/users/me/messages/m1/attachments/att-1")
            .with_status(200)
            .with_body(r#"{"size": 5, "data": "aGVsbG8"}"#)
            .create_async()
            .await;

        let mailbox = mailbox(&server);
        let descriptors = mailbox.attachment_descriptors("m1").await.unwrap();
        assert_eq!(descriptors, vec![AttachmentDescriptor::new("notes.txt", "att-1")]);

        let bytes = mailbox.attachment_bytes("m1", "att-1").await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_message_timestamp_uses_minimal_format() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gmail/v1/users/me/messages/m1")
            .match_query(Matcher::UrlEncoded("format".into(), "minimal".into()))
            .with_status(200)
            .with_body(r#"{"id": "m1", "internalDate": "1700000000000"}"#)
            .create_async()
            .await;

        let ts = mailbox(&server).message_timestamp("m1").await.unwrap();

        assert_eq!(ts, Some(1_700_000_000_000));
    }

    #[tokio::test]
    async fn test_list_labels() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gmail/v1/users/me/labels")
            .with_status(200)
            .with_body(
                r#"{"labels": [{"id": "INBOX", "name": "INBOX", "type": "system"}, {"id": "Label_1", "name": "Invoices", "type": "user"}]}"#,
            )
            .create_async()
            .await;

        let labels = mailbox(&server).list_labels().await.unwrap();

        assert_eq!(labels[1], LabelRef::new("Label_1", "Invoices"));
    }

    #[tokio::test]
    async fn test_not_found_is_not_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/gmail/v1/users/me/messages/gone")
            .match_query(Matcher::Any)
            .with_status(404)
            .with_body(r#"{"error": {"code": 404, "message": "Requested entity was not found."}}"#)
            .expect(1)
            .create_async()
            .await;

        let err = mailbox(&server).attachment_descriptors("gone").await.unwrap_err();

        assert!(matches!(err, SiftError::NotFound { .. }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/gmail/v1/users/me/labels")
            .with_status(503)
            .with_body("backend unavailable")
            .expect(3)
            .create_async()
            .await;

        let err = mailbox(&server).list_labels().await.unwrap_err();

        assert_eq!(err.code(), ErrorCode::NetServerError);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_unauthorized_maps_to_authentication() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/gmail/v1/users/me/labels")
            .with_status(401)
            .with_body("Invalid Credentials")
            .expect(1)
            .create_async()
            .await;

        let err = mailbox(&server).list_labels().await.unwrap_err();

        assert!(matches!(err, SiftError::Authentication { .. }));
    }

    #[test]
    fn test_from_config_requires_credentials() {
        let config = GmailConfig::default();
        let result = GmailMailbox::from_config(&config);
        assert!(matches!(
            result,
            Err(SiftError::Authentication {
                code: ErrorCode::AuthMissingCredentials,
                ..
            })
        ));
    }

    #[test]
    fn test_endpoint_escapes_segments() {
        let config = GmailConfig {
            base_url: "https://gmail.example.test/proxy/".to_string(),
            access_token: Some(SecretString::new("t".to_string())),
            ..Default::default()
        };
        let mailbox = GmailMailbox::from_config(&config).unwrap();

        let url = mailbox.endpoint(&["messages", "a/b"]);

        assert_eq!(
            url.as_str(),
            "https://gmail.example.test/proxy/gmail/v1/users/me/messages/a%2Fb"
        );
    }
}
