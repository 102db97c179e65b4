//! Factory for creating the attachment pipeline from configuration.

use std::sync::Arc;

use mailsift_core::{AttachmentPipeline, SiftConfig, SiftResult};
use mailsift_gmail::GmailMailbox;
use tracing::info;

/// Create a Gmail-backed attachment pipeline from configuration.
pub fn create_pipeline(config: &SiftConfig) -> SiftResult<AttachmentPipeline> {
    config.validate()?;

    let mailbox = GmailMailbox::from_config(&config.gmail)?;
    let pipeline = AttachmentPipeline::with_defaults(Arc::new(mailbox), config.pipeline.clone());

    info!(
        user_id = %config.gmail.user_id,
        extractors = pipeline.registry().len(),
        "Attachment pipeline ready"
    );
    Ok(pipeline)
}
