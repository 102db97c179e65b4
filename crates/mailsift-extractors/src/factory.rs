//! Factory for creating extractors.

use std::sync::Arc;

use crate::{Extractor, TextExtractor};

#[cfg(feature = "pdf")]
use crate::PdfExtractor;

#[cfg(feature = "excel")]
use crate::TabularExtractor;

/// Factory for creating content extractors.
pub struct ExtractorFactory;

impl ExtractorFactory {
    /// Create a spreadsheet extractor.
    #[cfg(feature = "excel")]
    pub fn tabular() -> Arc<dyn Extractor> {
        Arc::new(TabularExtractor::new())
    }

    /// Create a PDF extractor.
    #[cfg(feature = "pdf")]
    pub fn pdf() -> Arc<dyn Extractor> {
        Arc::new(PdfExtractor::new())
    }

    /// Create a PDF extractor with a custom per-page snippet length.
    #[cfg(feature = "pdf")]
    pub fn pdf_with_snippet_chars(snippet_chars: usize) -> Arc<dyn Extractor> {
        Arc::new(PdfExtractor::with_snippet_chars(snippet_chars))
    }

    /// Create a plain-text extractor.
    pub fn text() -> Arc<dyn Extractor> {
        Arc::new(TextExtractor::new())
    }

    /// Get all available extractors.
    #[allow(clippy::vec_init_then_push)]
    pub fn all() -> Vec<Arc<dyn Extractor>> {
        let mut extractors: Vec<Arc<dyn Extractor>> = Vec::new();

        #[cfg(feature = "excel")]
        extractors.push(Self::tabular());

        #[cfg(feature = "pdf")]
        extractors.push(Self::pdf());

        extractors.push(Self::text());

        extractors
    }
}
