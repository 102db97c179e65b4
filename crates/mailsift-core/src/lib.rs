//! mailsift-core - Core library for mailsift.
//!
//! This crate provides the mailbox port, the attachment pipeline that selects
//! messages and extracts structured content from their attachments, and the
//! configuration shared by the adapters and the server.
//!
//! # Example
//!
//! ```ignore
//! use mailsift_core::{AttachmentPipeline, PipelineConfig};
//!
//! let pipeline = AttachmentPipeline::with_defaults(mailbox, PipelineConfig::default());
//!
//! // Newest message whose subject contains "Quarterly report"
//! let results = pipeline.by_subject("Quarterly report").await?;
//!
//! // Ten most recent messages labelled "Invoices"
//! let results = pipeline.by_label("Invoices", 10).await?;
//! ```

pub mod config;
pub mod error;
pub mod pipeline;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{GmailConfig, PipelineConfig, RetryPolicy, ServerConfig, SiftConfig};
pub use error::{ErrorCode, SiftError, SiftResult};
pub use pipeline::{default_registry, AttachmentPipeline};
pub use traits::Mailbox;
pub use types::{AttachmentDescriptor, ExtractionResult, LabelRef, MessageRef};

pub use mailsift_extractors::{
    ExtractError, Extractor, ExtractorRegistry, FileType, PageSummary, Row, StructuredData,
};
