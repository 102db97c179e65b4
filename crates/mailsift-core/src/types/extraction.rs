//! Result of processing one attachment.

use mailsift_extractors::{FileType, StructuredData};

/// Structured content of one processed attachment.
///
/// Always carries the original attachment bytes, even when the structured
/// payload degraded to a notice.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionResult {
    pub file_name: String,
    pub file_type: FileType,
    pub data: StructuredData,
    pub raw_bytes: Vec<u8>,
}

impl ExtractionResult {
    /// Create a new extraction result.
    pub fn new(
        file_name: impl Into<String>,
        file_type: FileType,
        data: StructuredData,
        raw_bytes: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            file_type,
            data,
            raw_bytes,
        }
    }
}
