//! Registry mapping file types to content extractors.

use std::collections::HashMap;
use std::sync::Arc;

use crate::types::FileType;
use crate::Extractor;

/// Registry of extractors keyed by file type.
///
/// Resolution is a pure lookup: a file type either maps to exactly one
/// extractor or to none, in which case the attachment is skipped.
/// [`FileType::Unknown`] never resolves.
#[derive(Clone, Default)]
pub struct ExtractorRegistry {
    extractors: HashMap<FileType, Arc<dyn Extractor>>,
}

impl ExtractorRegistry {
    /// Create new empty registry.
    pub fn new() -> Self {
        Self {
            extractors: HashMap::new(),
        }
    }

    /// Create registry with all available extractors.
    pub fn with_defaults() -> Self {
        crate::ExtractorFactory::all()
            .into_iter()
            .fold(Self::new(), |registry, extractor| registry.register(extractor))
    }

    /// Register an extractor for every file type it supports.
    ///
    /// Replaces any extractor previously registered for those types.
    pub fn register(mut self, extractor: Arc<dyn Extractor>) -> Self {
        for file_type in extractor.supported_types() {
            if *file_type != FileType::Unknown {
                self.extractors.insert(*file_type, Arc::clone(&extractor));
            }
        }
        self
    }

    /// Resolve the extractor for a file type.
    pub fn resolve(&self, file_type: FileType) -> Option<Arc<dyn Extractor>> {
        self.extractors.get(&file_type).cloned()
    }

    /// Check if registry can handle a given file type.
    pub fn supports(&self, file_type: FileType) -> bool {
        self.extractors.contains_key(&file_type)
    }

    /// List all supported file types.
    pub fn supported_types(&self) -> Vec<FileType> {
        self.extractors.keys().copied().collect()
    }

    /// Get the number of file types with a registered extractor.
    pub fn len(&self) -> usize {
        self.extractors.len()
    }

    /// Check if the registry has no registered extractors.
    pub fn is_empty(&self) -> bool {
        self.extractors.is_empty()
    }
}

impl std::fmt::Debug for ExtractorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for (file_type, extractor) in &self.extractors {
            map.entry(file_type, &extractor.name());
        }
        map.finish()
    }
}
