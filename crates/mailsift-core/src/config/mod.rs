//! Configuration system for mailsift.

use std::str::FromStr;

use secrecy::SecretString;
use serde::Deserialize;

use crate::error::{SiftError, SiftResult};

/// Attachment pipeline configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Messages listed by the recent strategy when the caller gives no limit.
    pub default_recent_max: u32,
    /// Messages listed by the label strategy when the caller gives no limit.
    pub default_label_max: u32,
    /// Candidate ids requested by the subject strategy.
    pub subject_search_limit: u32,
    /// Attachments of one message downloaded concurrently.
    pub max_concurrent_downloads: usize,
    /// Characters kept per PDF page snippet.
    pub pdf_snippet_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            default_recent_max: 5,
            default_label_max: 10,
            subject_search_limit: 10,
            max_concurrent_downloads: 4,
            pdf_snippet_chars: 200,
        }
    }
}

/// Retry policy for transport calls.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    pub max_retries: u32,
    /// Initial delay before first retry (milliseconds)
    pub initial_delay_ms: u64,
    /// Maximum delay between retries (milliseconds)
    pub max_delay_ms: u64,
    /// Multiplier for exponential backoff
    pub multiplier: f32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 200,
            max_delay_ms: 5_000,
            multiplier: 2.0_f32,
        }
    }
}

/// Gmail adapter configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GmailConfig {
    /// Gmail API base URL.
    pub base_url: String,
    /// OAuth2 token endpoint used to refresh access tokens.
    pub token_url: String,
    /// Mailbox user ("me" for the authorized account).
    pub user_id: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// Retry policy for transient failures.
    pub retry: RetryPolicy,
    /// Fixed access token (takes precedence over refresh credentials).
    pub access_token: Option<SecretString>,
    /// OAuth2 client id.
    pub client_id: Option<String>,
    /// OAuth2 client secret.
    pub client_secret: Option<SecretString>,
    /// OAuth2 refresh token.
    pub refresh_token: Option<SecretString>,
}

impl Default for GmailConfig {
    fn default() -> Self {
        Self {
            base_url: "https://gmail.googleapis.com".to_string(),
            token_url: "https://oauth2.googleapis.com/token".to_string(),
            user_id: "me".to_string(),
            timeout_secs: 30,
            retry: RetryPolicy::default(),
            access_token: None,
            client_id: None,
            client_secret: None,
            refresh_token: None,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind host.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

/// Main mailsift configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SiftConfig {
    /// Attachment pipeline configuration.
    pub pipeline: PipelineConfig,
    /// Gmail adapter configuration.
    pub gmail: GmailConfig,
    /// HTTP server configuration.
    pub server: ServerConfig,
}

impl SiftConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> SiftResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| SiftError::Configuration(e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| SiftError::Configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| SiftError::Configuration(e.to_string()))?,
            _ => {
                return Err(SiftError::Configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
                ))
            }
        };

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        // Pipeline configuration
        env_parse("MAILSIFT_RECENT_MAX", &mut config.pipeline.default_recent_max);
        env_parse("MAILSIFT_LABEL_MAX", &mut config.pipeline.default_label_max);
        env_parse(
            "MAILSIFT_SUBJECT_SEARCH_LIMIT",
            &mut config.pipeline.subject_search_limit,
        );
        env_parse(
            "MAILSIFT_MAX_CONCURRENT_DOWNLOADS",
            &mut config.pipeline.max_concurrent_downloads,
        );
        env_parse("MAILSIFT_PDF_SNIPPET_CHARS", &mut config.pipeline.pdf_snippet_chars);

        // Gmail configuration
        if let Ok(url) = std::env::var("GMAIL_API_BASE_URL") {
            config.gmail.base_url = url;
        }
        if let Ok(url) = std::env::var("GMAIL_TOKEN_URL") {
            config.gmail.token_url = url;
        }
        if let Ok(user) = std::env::var("GMAIL_USER_ID") {
            config.gmail.user_id = user;
        }
        env_parse("GMAIL_TIMEOUT_SECS", &mut config.gmail.timeout_secs);
        env_parse("GMAIL_MAX_RETRIES", &mut config.gmail.retry.max_retries);
        if let Ok(token) = std::env::var("GMAIL_ACCESS_TOKEN") {
            config.gmail.access_token = Some(SecretString::new(token));
        }
        if let Ok(client_id) = std::env::var("GMAIL_CLIENT_ID") {
            config.gmail.client_id = Some(client_id);
        }
        if let Ok(secret) = std::env::var("GMAIL_CLIENT_SECRET") {
            config.gmail.client_secret = Some(SecretString::new(secret));
        }
        if let Ok(token) = std::env::var("GMAIL_REFRESH_TOKEN") {
            config.gmail.refresh_token = Some(SecretString::new(token));
        }

        // Server configuration
        if let Ok(host) = std::env::var("MAILSIFT_HOST") {
            config.server.host = host;
        }
        env_parse("MAILSIFT_PORT", &mut config.server.port);

        config
    }

    /// Check values that would make the pipeline unusable.
    pub fn validate(&self) -> SiftResult<()> {
        let pipeline = &self.pipeline;
        if pipeline.default_recent_max == 0
            || pipeline.default_label_max == 0
            || pipeline.subject_search_limit == 0
        {
            return Err(SiftError::Configuration(
                "pipeline limits must be at least 1".to_string(),
            ));
        }
        if pipeline.max_concurrent_downloads == 0 {
            return Err(SiftError::Configuration(
                "max_concurrent_downloads must be at least 1".to_string(),
            ));
        }
        if pipeline.pdf_snippet_chars == 0 {
            return Err(SiftError::Configuration(
                "pdf_snippet_chars must be at least 1".to_string(),
            ));
        }
        if self.gmail.base_url.trim().is_empty() {
            return Err(SiftError::Configuration("gmail.base_url is empty".to_string()));
        }
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> SiftConfigBuilder {
        SiftConfigBuilder::default()
    }
}

fn env_parse<T: FromStr>(key: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(key) {
        match raw.parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!("Ignoring invalid value for {}: {:?}", key, raw),
        }
    }
}

/// Builder for SiftConfig.
#[derive(Default)]
pub struct SiftConfigBuilder {
    config: SiftConfig,
}

impl SiftConfigBuilder {
    /// Set pipeline configuration.
    pub fn pipeline(mut self, config: PipelineConfig) -> Self {
        self.config.pipeline = config;
        self
    }

    /// Set Gmail configuration.
    pub fn gmail(mut self, config: GmailConfig) -> Self {
        self.config.gmail = config;
        self
    }

    /// Set server configuration.
    pub fn server(mut self, config: ServerConfig) -> Self {
        self.config.server = config;
        self
    }

    /// Set a fixed Gmail access token.
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.gmail.access_token = Some(SecretString::new(token.into()));
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> SiftResult<SiftConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
