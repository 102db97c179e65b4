//! Mailbox-side types: message references, attachment descriptors and labels.

use serde::{Deserialize, Serialize};

/// A message id paired with its provider receipt time.
///
/// The timestamp is only used to pick the newest subject-search candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    pub id: String,
    /// Epoch milliseconds, when the provider reports one.
    pub internal_timestamp: Option<i64>,
}

impl MessageRef {
    /// Create a new message reference.
    pub fn new(id: impl Into<String>, internal_timestamp: Option<i64>) -> Self {
        Self {
            id: id.into(),
            internal_timestamp,
        }
    }
}

/// One file-bearing part of a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttachmentDescriptor {
    pub filename: String,
    /// Provider handle used to download the part's bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment_handle: Option<String>,
}

impl AttachmentDescriptor {
    /// Create a descriptor for a downloadable attachment.
    pub fn new(filename: impl Into<String>, attachment_handle: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            attachment_handle: Some(attachment_handle.into()),
        }
    }

    /// Create a descriptor for a part without a download handle.
    pub fn without_handle(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            attachment_handle: None,
        }
    }

    /// Filename and handle, if the descriptor can be processed.
    ///
    /// Requires a non-empty filename and a present handle.
    pub fn eligible(&self) -> Option<(&str, &str)> {
        match self.attachment_handle.as_deref() {
            Some(handle) if !self.filename.is_empty() => Some((self.filename.as_str(), handle)),
            _ => None,
        }
    }
}

/// A mailbox label.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRef {
    pub id: String,
    pub name: String,
}

impl LabelRef {
    /// Create a new label reference.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    /// Case-insensitive exact comparison against a label name.
    pub fn matches_name(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_eligibility() {
        assert_eq!(
            AttachmentDescriptor::new("a.pdf", "h1").eligible(),
            Some(("a.pdf", "h1"))
        );
        assert!(AttachmentDescriptor::without_handle("a.pdf").eligible().is_none());
        assert!(AttachmentDescriptor::new("", "h1").eligible().is_none());
    }

    #[test]
    fn test_label_name_match_ignores_case_only() {
        let label = LabelRef::new("Label_7", "Facturas");
        assert!(label.matches_name("facturas"));
        assert!(label.matches_name("FACTURAS"));
        assert!(!label.matches_name("Factura"));
        assert!(!label.matches_name(" Facturas"));
    }
}
