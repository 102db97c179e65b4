//! Server state management.

use std::sync::Arc;

use mailsift_core::{AttachmentPipeline, Mailbox, PipelineConfig};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pipeline: Arc<AttachmentPipeline>,
}

impl AppState {
    /// Create a new application state.
    pub fn new(pipeline: AttachmentPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    /// Create state over any mailbox with the default extractors.
    pub fn with_mailbox(mailbox: Arc<dyn Mailbox>, config: PipelineConfig) -> Self {
        Self::new(AttachmentPipeline::with_defaults(mailbox, config))
    }

    /// The attachment pipeline.
    pub fn pipeline(&self) -> &AttachmentPipeline {
        &self.pipeline
    }
}
