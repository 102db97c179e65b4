//! Error types for mailsift operations.
//!
//! Errors carry a structured error code for programmatic handling and an
//! optional suggestion for resolution.

use thiserror::Error;

/// Result type alias for mailsift operations.
pub type SiftResult<T> = Result<T, SiftError>;

/// Main error type for all mailsift operations.
#[derive(Error, Debug)]
pub enum SiftError {
    /// Label name did not resolve to any label in the mailbox.
    #[error("Label not found: {label}")]
    LabelNotFound { label: String, code: ErrorCode },

    /// Input validation failed.
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        code: ErrorCode,
        suggestion: Option<String>,
    },

    /// Message or attachment not found in the mailbox.
    #[error("Not found: {message}")]
    NotFound {
        message: String,
        code: ErrorCode,
        message_id: Option<String>,
    },

    /// Mailbox authentication failed.
    #[error("Authentication error: {message}")]
    Authentication {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Mailbox provider rate limit exceeded.
    #[error("Rate limit exceeded: {message}")]
    RateLimit {
        message: String,
        code: ErrorCode,
        retry_after: Option<u64>,
    },

    /// Transport failure talking to the mailbox provider.
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        code: ErrorCode,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Provider returned a response that could not be interpreted.
    #[error("Parse error: {message}")]
    Parse { message: String, code: ErrorCode },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Error codes for programmatic handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    // Authentication (AUTH_xxx)
    AuthInvalidToken,
    AuthExpiredToken,
    AuthMissingCredentials,

    // Validation (VAL_xxx)
    ValInvalidInput,
    ValMissingField,

    // Label (LBL_xxx)
    LblNotFound,

    // Message (MSG_xxx)
    MsgNotFound,

    // Rate Limit (RATE_xxx)
    RateLimitExceeded,

    // Network (NET_xxx)
    NetTimeout,
    NetConnectionFailed,
    NetServerError,
    NetRequestRejected,

    // Parse (PARSE_xxx)
    ParseInvalidResponse,
    ParseInvalidEncoding,

    // Internal
    Internal,
}

impl ErrorCode {
    /// Get the string representation of the error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::AuthInvalidToken => "AUTH_001",
            ErrorCode::AuthExpiredToken => "AUTH_002",
            ErrorCode::AuthMissingCredentials => "AUTH_003",
            ErrorCode::ValInvalidInput => "VAL_001",
            ErrorCode::ValMissingField => "VAL_002",
            ErrorCode::LblNotFound => "LBL_001",
            ErrorCode::MsgNotFound => "MSG_001",
            ErrorCode::RateLimitExceeded => "RATE_001",
            ErrorCode::NetTimeout => "NET_001",
            ErrorCode::NetConnectionFailed => "NET_002",
            ErrorCode::NetServerError => "NET_003",
            ErrorCode::NetRequestRejected => "NET_004",
            ErrorCode::ParseInvalidResponse => "PARSE_001",
            ErrorCode::ParseInvalidEncoding => "PARSE_002",
            ErrorCode::Internal => "INT_001",
        }
    }
}

impl SiftError {
    /// Create a label-not-found error.
    pub fn label_not_found(label: impl Into<String>) -> Self {
        Self::LabelNotFound {
            label: label.into(),
            code: ErrorCode::LblNotFound,
        }
    }

    /// Create a validation error with suggestion.
    pub fn validation_with_suggestion(
        message: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::Validation {
            message: message.into(),
            code: ErrorCode::ValInvalidInput,
            suggestion: Some(suggestion.into()),
        }
    }

    /// Create a missing-field validation error.
    pub fn missing_field(field: &str) -> Self {
        Self::Validation {
            message: format!("'{}' must not be empty", field),
            code: ErrorCode::ValMissingField,
            suggestion: None,
        }
    }

    /// Create a message-not-found error.
    pub fn message_not_found(message_id: impl Into<String>) -> Self {
        let id = message_id.into();
        Self::NotFound {
            message: format!("Message with id '{}' not found", id),
            code: ErrorCode::MsgNotFound,
            message_id: Some(id),
        }
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code: ErrorCode::AuthInvalidToken,
            source: None,
        }
    }

    /// Create a missing-credentials error.
    pub fn missing_credentials(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            code: ErrorCode::AuthMissingCredentials,
            source: None,
        }
    }

    /// Create a transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            code: ErrorCode::NetConnectionFailed,
            source: None,
        }
    }

    /// Create a transport error with an explicit code and source.
    pub fn transport_with_source(
        message: impl Into<String>,
        code: ErrorCode,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Transport {
            message: message.into(),
            code,
            source: Some(Box::new(source)),
        }
    }

    /// Create a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
            code: ErrorCode::ParseInvalidResponse,
        }
    }

    /// Get the error code.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::LabelNotFound { code, .. } => *code,
            Self::Validation { code, .. } => *code,
            Self::NotFound { code, .. } => *code,
            Self::Authentication { code, .. } => *code,
            Self::RateLimit { code, .. } => *code,
            Self::Transport { code, .. } => *code,
            Self::Parse { code, .. } => *code,
            _ => ErrorCode::Internal,
        }
    }

    /// Whether retrying the failed call could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::RateLimit { .. } => true,
            Self::Transport { code, .. } => matches!(
                code,
                ErrorCode::NetTimeout | ErrorCode::NetConnectionFailed | ErrorCode::NetServerError
            ),
            _ => false,
        }
    }

    /// Get a user-friendly suggestion for resolving this error.
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            Self::LabelNotFound { .. } => Some("Check the label name; matching ignores case but not spelling"),
            Self::Authentication { .. } => Some("Please check the mailbox credentials or re-authorize access"),
            Self::RateLimit { .. } => Some("Please wait before making more requests"),
            Self::NotFound { .. } => Some("Please check the message ID and ensure it exists"),
            Self::Validation { suggestion, .. } => suggestion.as_deref(),
            Self::Transport { .. } => Some("Please check network connectivity to the mailbox provider"),
            _ => None,
        }
    }

    /// Convert from a provider HTTP status code.
    pub fn from_http_status(status: u16, body: &str) -> Self {
        match status {
            400 => Self::Validation {
                message: body.to_string(),
                code: ErrorCode::ValInvalidInput,
                suggestion: Some("Please check your request parameters".to_string()),
            },
            401 => Self::Authentication {
                message: body.to_string(),
                code: ErrorCode::AuthExpiredToken,
                source: None,
            },
            403 => Self::Authentication {
                message: body.to_string(),
                code: ErrorCode::AuthInvalidToken,
                source: None,
            },
            404 => Self::NotFound {
                message: body.to_string(),
                code: ErrorCode::MsgNotFound,
                message_id: None,
            },
            429 => Self::RateLimit {
                message: body.to_string(),
                code: ErrorCode::RateLimitExceeded,
                retry_after: None,
            },
            500..=599 => Self::Transport {
                message: format!("HTTP {}: {}", status, body),
                code: ErrorCode::NetServerError,
                source: None,
            },
            _ => Self::Transport {
                message: format!("HTTP {}: {}", status, body),
                code: ErrorCode::NetRequestRejected,
                source: None,
            },
        }
    }
}
