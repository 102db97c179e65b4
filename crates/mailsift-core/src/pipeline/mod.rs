//! Attachment retrieval-and-extraction pipeline.
//!
//! Each selection strategy turns a mailbox query into message ids, walks the
//! attachment descriptors of every selected message, downloads the bytes and
//! hands them to the extractor registered for the file type. Failures of a
//! single attachment (or of a single message in multi-message strategies) are
//! logged and dropped; only operation-level failures reach the caller.

mod selection;

pub use selection::{find_label, newest_candidate};

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt};
use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use mailsift_extractors::{ExtractError, ExtractorRegistry, FileType};

use crate::config::PipelineConfig;
use crate::error::{SiftError, SiftResult};
use crate::traits::Mailbox;
use crate::types::{AttachmentDescriptor, ExtractionResult, MessageRef};

/// Non-fatal failure of one attachment. Logged, never returned.
#[derive(Debug, Error)]
enum AttachmentItemError {
    #[error("download failed: {0}")]
    Download(#[source] SiftError),

    #[error("extraction failed: {0}")]
    Extract(#[source] ExtractError),
}

/// Build the default extractor registry for a pipeline configuration.
pub fn default_registry(config: &PipelineConfig) -> ExtractorRegistry {
    let registry = ExtractorRegistry::with_defaults();

    #[cfg(feature = "pdf")]
    let registry = registry.register(
        mailsift_extractors::ExtractorFactory::pdf_with_snippet_chars(config.pdf_snippet_chars),
    );

    #[cfg(not(feature = "pdf"))]
    let _ = config;

    registry
}

/// Orchestrates message selection, attachment download and extraction.
pub struct AttachmentPipeline {
    mailbox: Arc<dyn Mailbox>,
    registry: ExtractorRegistry,
    config: PipelineConfig,
}

impl AttachmentPipeline {
    /// Create a pipeline with an explicit extractor registry.
    pub fn new(mailbox: Arc<dyn Mailbox>, registry: ExtractorRegistry, config: PipelineConfig) -> Self {
        Self {
            mailbox,
            registry,
            config,
        }
    }

    /// Create a pipeline with all available extractors.
    pub fn with_defaults(mailbox: Arc<dyn Mailbox>, config: PipelineConfig) -> Self {
        let registry = default_registry(&config);
        Self::new(mailbox, registry, config)
    }

    /// Pipeline configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Extractor registry used for dispatch.
    pub fn registry(&self) -> &ExtractorRegistry {
        &self.registry
    }

    /// Process every attachment of the `max_results` most recent messages.
    pub async fn recent(&self, max_results: u32) -> SiftResult<Vec<ExtractionResult>> {
        self.recent_with_cancel(max_results, &CancellationToken::new())
            .await
    }

    /// [`recent`](Self::recent) with a cancellation signal.
    #[instrument(skip(self, cancel))]
    pub async fn recent_with_cancel(
        &self,
        max_results: u32,
        cancel: &CancellationToken,
    ) -> SiftResult<Vec<ExtractionResult>> {
        validate_max_results(max_results)?;

        let message_ids = self.mailbox.list_recent_message_ids(max_results).await?;
        let results = self.process_messages(&message_ids, cancel).await;

        info!(
            messages = message_ids.len(),
            results = results.len(),
            "Processed recent messages"
        );
        Ok(results)
    }

    /// Process the attachments of a single message.
    pub async fn by_message_id(&self, message_id: &str) -> SiftResult<Vec<ExtractionResult>> {
        self.by_message_id_with_cancel(message_id, &CancellationToken::new())
            .await
    }

    /// [`by_message_id`](Self::by_message_id) with a cancellation signal.
    #[instrument(skip(self, cancel))]
    pub async fn by_message_id_with_cancel(
        &self,
        message_id: &str,
        cancel: &CancellationToken,
    ) -> SiftResult<Vec<ExtractionResult>> {
        if message_id.trim().is_empty() {
            return Err(SiftError::missing_field("message_id"));
        }

        let descriptors = self.mailbox.attachment_descriptors(message_id).await?;
        let results = self.process_message(message_id, &descriptors, cancel).await;

        info!(results = results.len(), "Processed message");
        Ok(results)
    }

    /// Process the attachments of the newest message whose subject contains `subject`.
    pub async fn by_subject(&self, subject: &str) -> SiftResult<Vec<ExtractionResult>> {
        self.by_subject_with_cancel(subject, &CancellationToken::new())
            .await
    }

    /// [`by_subject`](Self::by_subject) with a cancellation signal.
    #[instrument(skip(self, cancel))]
    pub async fn by_subject_with_cancel(
        &self,
        subject: &str,
        cancel: &CancellationToken,
    ) -> SiftResult<Vec<ExtractionResult>> {
        if subject.trim().is_empty() {
            return Err(SiftError::missing_field("subject"));
        }

        let candidate_ids = self
            .mailbox
            .search_message_ids_by_subject(subject, self.config.subject_search_limit)
            .await?;
        if candidate_ids.is_empty() {
            debug!("No message matches subject");
            return Ok(Vec::new());
        }

        let mut candidates = self.fetch_candidates(&candidate_ids).await;
        while let Some(selected) = newest_candidate(&candidates) {
            let selected_id = selected.id.clone();
            if selected.internal_timestamp.is_none() {
                warn!(
                    message_id = %selected_id,
                    "No candidate carries a timestamp, using first readable candidate"
                );
            }

            let descriptors = match self.mailbox.attachment_descriptors(&selected_id).await {
                Ok(descriptors) => descriptors,
                Err(e) => {
                    warn!(message_id = %selected_id, "Skipping subject candidate: {}", e);
                    candidates.retain(|candidate| candidate.id != selected_id);
                    continue;
                }
            };
            let results = self.process_message(&selected_id, &descriptors, cancel).await;

            info!(
                message_id = %selected_id,
                candidates = candidate_ids.len(),
                results = results.len(),
                "Processed newest subject match"
            );
            return Ok(results);
        }

        warn!(
            candidates = candidate_ids.len(),
            "No subject candidate could be read"
        );
        Ok(Vec::new())
    }

    /// Process every attachment of up to `max_results` messages carrying a label.
    ///
    /// Fails with [`SiftError::LabelNotFound`] when no label matches
    /// `label_name` case-insensitively; no messages are listed in that case.
    pub async fn by_label(
        &self,
        label_name: &str,
        max_results: u32,
    ) -> SiftResult<Vec<ExtractionResult>> {
        self.by_label_with_cancel(label_name, max_results, &CancellationToken::new())
            .await
    }

    /// [`by_label`](Self::by_label) with a cancellation signal.
    #[instrument(skip(self, cancel))]
    pub async fn by_label_with_cancel(
        &self,
        label_name: &str,
        max_results: u32,
        cancel: &CancellationToken,
    ) -> SiftResult<Vec<ExtractionResult>> {
        validate_max_results(max_results)?;
        if label_name.trim().is_empty() {
            return Err(SiftError::missing_field("label_name"));
        }

        let labels = self.mailbox.list_labels().await?;
        let label = find_label(&labels, label_name)
            .ok_or_else(|| SiftError::label_not_found(label_name))?;
        debug!(label_id = %label.id, "Resolved label");

        let message_ids = self
            .mailbox
            .list_message_ids_by_label(&label.id, max_results)
            .await?;
        let results = self.process_messages(&message_ids, cancel).await;

        info!(
            label_id = %label.id,
            messages = message_ids.len(),
            results = results.len(),
            "Processed labelled messages"
        );
        Ok(results)
    }

    /// Read the timestamp of every subject candidate, skipping unreadable ones.
    async fn fetch_candidates(&self, message_ids: &[String]) -> Vec<MessageRef> {
        let mut candidates = Vec::with_capacity(message_ids.len());
        for message_id in message_ids {
            match self.mailbox.message_timestamp(message_id).await {
                Ok(timestamp) => candidates.push(MessageRef::new(message_id.clone(), timestamp)),
                Err(e) => warn!(message_id = %message_id, "Skipping subject candidate: {}", e),
            }
        }
        candidates
    }

    /// Visit messages in listing order; a message whose descriptors cannot be read is skipped.
    async fn process_messages(
        &self,
        message_ids: &[String],
        cancel: &CancellationToken,
    ) -> Vec<ExtractionResult> {
        let mut results = Vec::new();

        for (visited, message_id) in message_ids.iter().enumerate() {
            if cancel.is_cancelled() {
                info!(
                    remaining = message_ids.len() - visited,
                    "Cancelled, not visiting remaining messages"
                );
                break;
            }

            match self.mailbox.attachment_descriptors(message_id).await {
                Ok(descriptors) => {
                    results.extend(self.process_message(message_id, &descriptors, cancel).await)
                }
                Err(e) => warn!(message_id = %message_id, "Skipping message: {}", e),
            }
        }

        results
    }

    /// Process the eligible descriptors of one message.
    ///
    /// Downloads run with bounded concurrency; results keep descriptor order.
    /// Once `cancel` fires no new download starts, but attachments already in
    /// flight finish and are returned.
    fn process_message<'a>(
        &'a self,
        message_id: &'a str,
        descriptors: &'a [AttachmentDescriptor],
        cancel: &'a CancellationToken,
    ) -> BoxFuture<'a, Vec<ExtractionResult>> {
        let concurrency = self.config.max_concurrent_downloads.max(1);

        stream::iter(descriptors.iter().filter_map(AttachmentDescriptor::eligible))
            .map(move |(file_name, handle)| async move {
                if cancel.is_cancelled() {
                    debug!(message_id = %message_id, file_name = %file_name, "Cancelled before download");
                    return None;
                }

                match self.process_attachment(message_id, file_name, handle).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(
                            message_id = %message_id,
                            file_name = %file_name,
                            "Dropping attachment: {}",
                            e
                        );
                        None
                    }
                }
            })
            .buffered(concurrency)
            .filter_map(|result| async move { result })
            .collect()
            .boxed()
    }

    /// Download, classify and extract one attachment.
    ///
    /// `Ok(None)` means the file type has no extractor.
    async fn process_attachment(
        &self,
        message_id: &str,
        file_name: &str,
        handle: &str,
    ) -> Result<Option<ExtractionResult>, AttachmentItemError> {
        let raw_bytes = self
            .mailbox
            .attachment_bytes(message_id, handle)
            .await
            .map_err(AttachmentItemError::Download)?;

        let file_type = FileType::from_file_name(file_name);
        debug!(
            message_id = %message_id,
            file_name = %file_name,
            file_type = %file_type,
            bytes = raw_bytes.len(),
            "Downloaded attachment"
        );

        let Some(extractor) = self.registry.resolve(file_type) else {
            debug!(file_name = %file_name, "No extractor for file type, skipping");
            return Ok(None);
        };

        let data = extractor
            .extract(&raw_bytes)
            .await
            .map_err(AttachmentItemError::Extract)?;

        Ok(Some(ExtractionResult::new(file_name, file_type, data, raw_bytes)))
    }
}

fn validate_max_results(max_results: u32) -> SiftResult<()> {
    if max_results == 0 {
        return Err(SiftError::validation_with_suggestion(
            "max_results must be at least 1",
            "Pass a positive number of messages to list",
        ));
    }
    Ok(())
}
