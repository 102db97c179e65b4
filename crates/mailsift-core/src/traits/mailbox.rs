//! Mailbox access port.

use async_trait::async_trait;

use crate::error::SiftResult;
use crate::types::{AttachmentDescriptor, LabelRef};

/// Read-only, authenticated access to a mailbox.
///
/// Implementations own their credentials and transport. They must be safe for
/// concurrent use by several in-flight calls.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Mailbox: Send + Sync {
    /// List ids of the most recent messages, at most `max_results`.
    async fn list_recent_message_ids(&self, max_results: u32) -> SiftResult<Vec<String>>;

    /// Attachment descriptors of one message, in MIME part order.
    async fn attachment_descriptors(&self, message_id: &str)
        -> SiftResult<Vec<AttachmentDescriptor>>;

    /// Raw bytes of one attachment.
    async fn attachment_bytes(&self, message_id: &str, attachment_handle: &str)
        -> SiftResult<Vec<u8>>;

    /// Every label defined in the mailbox.
    async fn list_labels(&self) -> SiftResult<Vec<LabelRef>>;

    /// List ids of messages carrying a label, at most `max_results`.
    async fn list_message_ids_by_label(
        &self,
        label_id: &str,
        max_results: u32,
    ) -> SiftResult<Vec<String>>;

    /// List ids of messages whose subject contains `subject`, at most `max_results`.
    async fn search_message_ids_by_subject(
        &self,
        subject: &str,
        max_results: u32,
    ) -> SiftResult<Vec<String>>;

    /// Provider receipt time of a message in epoch milliseconds, if known.
    async fn message_timestamp(&self, message_id: &str) -> SiftResult<Option<i64>>;
}
