//! Core types for attachment content extraction.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// File-type classification of an attachment, derived from its filename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FileType {
    /// Spreadsheet workbook (`.xls`, `.xlsx`).
    Excel,
    /// PDF document.
    Pdf,
    /// Plain text file.
    Text,
    /// Anything else. Never has an extractor.
    Unknown,
}

impl FileType {
    /// Classify a filename by its lowercase extension.
    pub fn from_file_name(file_name: &str) -> Self {
        let ext = Path::new(file_name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase());

        match ext.as_deref() {
            Some("xls" | "xlsx") => FileType::Excel,
            Some("pdf") => FileType::Pdf,
            Some("txt") => FileType::Text,
            _ => FileType::Unknown,
        }
    }

    /// Stable name used in logs and serialized output.
    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Excel => "Excel",
            FileType::Pdf => "Pdf",
            FileType::Text => "Text",
            FileType::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One spreadsheet row keyed by its sheet's header cells.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// Per-page snippets of a paginated document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    /// Number of pages in the document.
    pub total_pages: usize,
    /// One snippet per page, in page order.
    pub page_snippets: Vec<String>,
}

/// Structured payload produced by an extractor.
///
/// Serialized untagged so the JSON shape follows the payload itself:
/// an array of objects, a page summary object, an array of strings or a plain string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StructuredData {
    /// Spreadsheet rows, concatenated across sheets.
    Rows(Vec<Row>),
    /// Page snippets of a document.
    Pages(PageSummary),
    /// Lines of a text file.
    Lines(Vec<String>),
    /// Human-readable notice used when content could not be read
    /// (for example a password-protected document).
    Notice(String),
}

impl StructuredData {
    /// Rows payload, if this is tabular data.
    pub fn as_rows(&self) -> Option<&[Row]> {
        match self {
            StructuredData::Rows(rows) => Some(rows),
            _ => None,
        }
    }

    /// Page summary, if this is paginated data.
    pub fn as_pages(&self) -> Option<&PageSummary> {
        match self {
            StructuredData::Pages(pages) => Some(pages),
            _ => None,
        }
    }

    /// Lines payload, if this is line data.
    pub fn as_lines(&self) -> Option<&[String]> {
        match self {
            StructuredData::Lines(lines) => Some(lines),
            _ => None,
        }
    }

    /// Notice text, if extraction degraded to a notice.
    pub fn as_notice(&self) -> Option<&str> {
        match self {
            StructuredData::Notice(notice) => Some(notice),
            _ => None,
        }
    }
}
