//! Extraction error types.

use thiserror::Error;

/// Errors that can occur during content extraction.
#[derive(Error, Debug)]
pub enum ExtractError {
    /// Extraction process failed.
    #[error("Extraction failed: {0}")]
    ExtractionFailed(String),

    /// Spreadsheet-specific extraction error.
    #[cfg(feature = "excel")]
    #[error("Spreadsheet extraction error: {0}")]
    Spreadsheet(String),

    /// PDF-specific extraction error.
    #[cfg(feature = "pdf")]
    #[error("PDF extraction error: {0}")]
    Pdf(String),

    /// Task join error from spawn_blocking (includes parser panics).
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

/// Result type for extraction operations.
pub type ExtractResult<T> = Result<T, ExtractError>;
