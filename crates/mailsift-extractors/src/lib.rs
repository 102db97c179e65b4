//! mailsift-extractors - Content extraction for email attachments.
//!
//! Turns raw attachment bytes into a structured payload with a unified
//! trait-based interface.
//!
//! # Features
//!
//! - `excel` (default) - Spreadsheet rows via calamine
//! - `pdf` (default) - PDF page snippets via pdf-extract
//!
//! Plain-text extraction is always available.
//!
//! # Example
//!
//! ```ignore
//! use mailsift_extractors::{ExtractorRegistry, FileType};
//!
//! let registry = ExtractorRegistry::with_defaults();
//! let file_type = FileType::from_file_name("report.xlsx");
//! if let Some(extractor) = registry.resolve(file_type) {
//!     let data = extractor.extract(&bytes).await?;
//! }
//! ```

mod error;
mod factory;
mod registry;
mod text;
mod types;

#[cfg(feature = "excel")]
mod tabular;

#[cfg(feature = "pdf")]
mod pdf;

pub use error::{ExtractError, ExtractResult};
pub use factory::ExtractorFactory;
pub use registry::ExtractorRegistry;
pub use text::TextExtractor;
pub use types::{FileType, PageSummary, Row, StructuredData};

#[cfg(feature = "excel")]
pub use tabular::TabularExtractor;

#[cfg(feature = "pdf")]
pub use pdf::{PdfExtractor, PASSWORD_PROTECTED_NOTICE};

use async_trait::async_trait;

/// Core Extractor trait - all content extractors implement this.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// Extract a structured payload from raw bytes.
    async fn extract(&self, content: &[u8]) -> ExtractResult<StructuredData>;

    /// File types this extractor handles.
    fn supported_types(&self) -> &[FileType];

    /// Check if this extractor handles the given file type.
    fn supports(&self, file_type: FileType) -> bool {
        self.supported_types().contains(&file_type)
    }

    /// Human-readable name for this extractor.
    fn name(&self) -> &str;
}
