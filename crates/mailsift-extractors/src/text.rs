//! Plain-text line extraction.

use async_trait::async_trait;

use crate::error::ExtractResult;
use crate::types::{FileType, StructuredData};
use crate::Extractor;

const UTF8_BOM: &str = "\u{feff}";

/// Splits a text attachment into lines.
///
/// Bytes are decoded as UTF-8 (invalid sequences replaced), a leading byte-order
/// mark is dropped and `\n` / `\r\n` terminators are removed. Lines are otherwise
/// kept exactly as decoded, blank lines included.
#[derive(Debug, Clone, Default)]
pub struct TextExtractor;

impl TextExtractor {
    /// Create new text extractor.
    pub fn new() -> Self {
        Self
    }

    fn split_lines(content: &[u8]) -> Vec<String> {
        let decoded = String::from_utf8_lossy(content);
        let text = decoded.strip_prefix(UTF8_BOM).unwrap_or(&decoded);
        text.lines().map(str::to_string).collect()
    }
}

#[async_trait]
impl Extractor for TextExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<StructuredData> {
        Ok(StructuredData::Lines(Self::split_lines(content)))
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Text]
    }

    fn name(&self) -> &str {
        "text-lines"
    }
}
