//! mailsift-gmail - Gmail adapter for mailsift.
//!
//! Implements the [`Mailbox`](mailsift_core::Mailbox) port over the Gmail REST
//! API. Credentials come from a [`TokenProvider`]: either a fixed access token
//! or an OAuth2 refresh token exchanged on demand.
//!
//! ```ignore
//! use mailsift_core::{AttachmentPipeline, SiftConfig};
//! use mailsift_gmail::GmailMailbox;
//!
//! let config = SiftConfig::from_env();
//! let mailbox = GmailMailbox::from_config(&config.gmail)?;
//! let pipeline = AttachmentPipeline::with_defaults(Arc::new(mailbox), config.pipeline);
//! ```

mod api;
mod auth;
mod client;

pub use auth::{RefreshTokenProvider, StaticTokenProvider, TokenProvider};
pub use client::GmailMailbox;
