//! PDF page-snippet extraction using pdf-extract.
//!
//! Each page's text is truncated to a fixed number of characters. Documents
//! that cannot be read because they are encrypted produce a notice instead of
//! an error, so callers still receive the original bytes.

use std::panic::{self, AssertUnwindSafe};

use async_trait::async_trait;

use crate::error::{ExtractError, ExtractResult};
use crate::types::{FileType, PageSummary, StructuredData};
use crate::Extractor;

/// Notice returned in place of page data for password-protected documents.
pub const PASSWORD_PROTECTED_NOTICE: &str =
    "The file is password protected and its content cannot be read.";

const DEFAULT_SNIPPET_CHARS: usize = 200;
const ELLIPSIS: &str = "...";

/// PDF content extractor using pdf-extract library.
///
/// Extracts per-page text, wrapping synchronous pdf-extract calls in
/// spawn_blocking to avoid blocking the async runtime.
#[derive(Debug, Clone)]
pub struct PdfExtractor {
    /// Maximum characters kept per page before the ellipsis is appended.
    snippet_chars: usize,
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor {
    /// Create new PDF extractor with default settings.
    pub fn new() -> Self {
        Self {
            snippet_chars: DEFAULT_SNIPPET_CHARS,
        }
    }

    /// Create PDF extractor with a custom per-page snippet length.
    pub fn with_snippet_chars(snippet_chars: usize) -> Self {
        Self { snippet_chars }
    }

    /// Extract pages synchronously (called within spawn_blocking).
    fn extract_sync(content: Vec<u8>, snippet_chars: usize) -> Result<StructuredData, ExtractError> {
        // pdf-extract panics on some malformed or encrypted inputs.
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem_by_pages(&content)
        }));

        let failure = match outcome {
            Ok(Ok(pages)) => return Ok(StructuredData::Pages(Self::summarize(pages, snippet_chars))),
            Ok(Err(e)) => e.to_string(),
            Err(_) => "PDF parser panicked".to_string(),
        };

        if Self::is_password_protected(&content, &failure) {
            tracing::debug!("PDF is encrypted, returning notice: {}", failure);
            return Ok(StructuredData::Notice(PASSWORD_PROTECTED_NOTICE.to_string()));
        }

        Err(ExtractError::Pdf(failure))
    }

    /// Build page snippets, truncating long pages.
    fn summarize(pages: Vec<String>, snippet_chars: usize) -> PageSummary {
        let page_snippets: Vec<String> = pages
            .into_iter()
            .map(|text| Self::snippet(text, snippet_chars))
            .collect();

        PageSummary {
            total_pages: page_snippets.len(),
            page_snippets,
        }
    }

    fn snippet(text: String, snippet_chars: usize) -> String {
        match text.char_indices().nth(snippet_chars) {
            Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
            None => text,
        }
    }

    /// Decide whether an extraction failure was caused by encryption.
    fn is_password_protected(content: &[u8], failure: &str) -> bool {
        let failure = failure.to_lowercase();
        if ["encrypt", "password", "decrypt"]
            .iter()
            .any(|hint| failure.contains(hint))
        {
            return true;
        }

        match lopdf::Document::load_mem(content) {
            Ok(doc) => doc.is_encrypted(),
            Err(_) => content.windows(b"/Encrypt".len()).any(|w| w == b"/Encrypt"),
        }
    }
}

#[async_trait]
impl Extractor for PdfExtractor {
    async fn extract(&self, content: &[u8]) -> ExtractResult<StructuredData> {
        let content = content.to_vec();
        let snippet_chars = self.snippet_chars;

        tokio::task::spawn_blocking(move || Self::extract_sync(content, snippet_chars)).await?
    }

    fn supported_types(&self) -> &[FileType] {
        &[FileType::Pdf]
    }

    fn name(&self) -> &str {
        "pdf-extract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Document, Object, Stream};

    fn hello_pdf() -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        });
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal("Hello World")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        };
        doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buffer = Vec::new();
        doc.save_to(&mut buffer).unwrap();
        buffer
    }

    #[test]
    fn test_short_page_kept_verbatim() {
        assert_eq!(PdfExtractor::snippet("short".to_string(), 200), "short");
    }

    #[test]
    fn test_long_page_truncated_with_ellipsis() {
        let text = "x".repeat(250);
        let snippet = PdfExtractor::snippet(text, 200);
        assert_eq!(snippet.len(), 203);
        assert!(snippet.ends_with("..."));
    }

    #[test]
    fn test_exactly_limit_is_not_truncated() {
        let text = "y".repeat(200);
        assert_eq!(PdfExtractor::snippet(text.clone(), 200), text);
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let text = "ñ".repeat(201);
        let snippet = PdfExtractor::snippet(text, 200);
        assert_eq!(snippet.chars().count(), 203);
    }

    #[test]
    fn test_summarize_counts_pages() {
        let summary = PdfExtractor::summarize(vec!["a".into(), "b".into(), String::new()], 200);
        assert_eq!(summary.total_pages, 3);
        assert_eq!(summary.page_snippets, vec!["a", "b", ""]);
    }

    #[tokio::test]
    async fn test_extracts_one_snippet_per_page() {
        let extractor = PdfExtractor::new();
        let data = extractor.extract(&hello_pdf()).await.unwrap();

        let pages = data.as_pages().expect("page summary");
        assert_eq!(pages.total_pages, 1);
        assert_eq!(pages.page_snippets.len(), 1);
    }

    #[tokio::test]
    async fn test_encrypted_document_yields_notice() {
        let bytes = b"%PDF-1.4\ntrailer\n<< /Encrypt 5 0 R /Root 1 0 R >>\n%%EOF".to_vec();
        let extractor = PdfExtractor::new();

        let data = extractor.extract(&bytes).await.unwrap();

        assert_eq!(data.as_notice(), Some(PASSWORD_PROTECTED_NOTICE));
    }

    #[tokio::test]
    async fn test_garbage_is_an_error() {
        let extractor = PdfExtractor::new();
        let result = extractor.extract(b"not a pdf at all").await;
        assert!(result.is_err());
    }

    #[test]
    fn test_supports_only_pdf() {
        let extractor = PdfExtractor::with_snippet_chars(50);
        assert!(extractor.supports(FileType::Pdf));
        assert!(!extractor.supports(FileType::Excel));
        assert_eq!(extractor.snippet_chars, 50);
    }
}
