//! Gmail REST wire types and payload helpers.

use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;
use serde::Deserialize;

use mailsift_core::{AttachmentDescriptor, LabelRef, SiftError, SiftResult};

/// Gmail returns URL-safe base64 with or without trailing padding.
const URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ListMessagesResponse {
    #[serde(default)]
    pub messages: Vec<MessageId>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessageId {
    pub id: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Message {
    pub internal_date: Option<String>,
    pub payload: Option<MessagePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessagePart {
    #[serde(default)]
    pub filename: String,
    pub body: Option<MessagePartBody>,
    #[serde(default)]
    pub parts: Vec<MessagePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct MessagePartBody {
    pub attachment_id: Option<String>,
    pub data: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ListLabelsResponse {
    #[serde(default)]
    pub labels: Vec<Label>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct Label {
    pub id: String,
    pub name: String,
}

impl From<Label> for LabelRef {
    fn from(label: Label) -> Self {
        LabelRef::new(label.id, label.name)
    }
}

impl Message {
    /// Every named part of the MIME tree, depth-first.
    pub fn attachment_descriptors(&self) -> Vec<AttachmentDescriptor> {
        let mut descriptors = Vec::new();
        if let Some(payload) = &self.payload {
            collect_descriptors(payload, &mut descriptors);
        }
        descriptors
    }

    /// Receipt time in epoch milliseconds.
    pub fn internal_timestamp(&self) -> Option<i64> {
        self.internal_date
            .as_deref()
            .and_then(|raw| raw.trim().parse().ok())
    }
}

fn collect_descriptors(part: &MessagePart, out: &mut Vec<AttachmentDescriptor>) {
    if !part.filename.is_empty() {
        out.push(AttachmentDescriptor {
            filename: part.filename.clone(),
            attachment_handle: part
                .body
                .as_ref()
                .and_then(|body| body.attachment_id.clone()),
        });
    }
    for child in &part.parts {
        collect_descriptors(child, out);
    }
}

/// Decode the `data` field of an attachment body.
pub(crate) fn decode_attachment_data(data: &str) -> SiftResult<Vec<u8>> {
    URL_SAFE_LENIENT
        .decode(data.trim())
        .map_err(|e| SiftError::Parse {
            message: format!("Invalid attachment encoding: {}", e),
            code: mailsift_core::ErrorCode::ParseInvalidEncoding,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_padding_optional() {
        assert_eq!(decode_attachment_data("aGVsbG8").unwrap(), b"hello");
        assert_eq!(decode_attachment_data("aGVsbG8=").unwrap(), b"hello");
        assert_eq!(decode_attachment_data("-_8").unwrap(), vec![0xfb, 0xff]);
    }

    #[test]
    fn test_decode_rejects_standard_alphabet() {
        let err = decode_attachment_data("+/8=").unwrap_err();
        assert_eq!(err.code(), mailsift_core::ErrorCode::ParseInvalidEncoding);
    }

    #[test]
    fn test_nested_parts_are_walked() {
        let message: Message = serde_json::from_str(
            r#"{
                "id": "m1",
                "internalDate": "1700000000000",
                "payload": {
                    "mimeType": "multipart/mixed",
                    "filename": "",
                    "parts": [
                        {"mimeType": "text/plain", "filename": "", "body": {"size": 4, "data": "Ym9keQ"}},
                        {"mimeType": "application/pdf", "filename": "a.pdf", "body": {"attachmentId": "att-1"}},
                        {
                            "mimeType": "multipart/related",
                            "filename": "",
                            "parts": [
                                {"mimeType": "text/plain", "filename": "notes.txt", "body": {"attachmentId": "att-2"}},
                                {"mimeType": "image/png", "filename": "logo.png", "body": {"data": "AAAA"}}
                            ]
                        }
                    ]
                }
            }"#,
        )
        .unwrap();

        assert_eq!(
            message.attachment_descriptors(),
            vec![
                AttachmentDescriptor::new("a.pdf", "att-1"),
                AttachmentDescriptor::new("notes.txt", "att-2"),
                AttachmentDescriptor::without_handle("logo.png"),
            ]
        );
        assert_eq!(message.internal_timestamp(), Some(1_700_000_000_000));
    }

    #[test]
    fn test_unparsable_internal_date() {
        let message: Message =
            serde_json::from_str(r#"{"id": "m1", "internalDate": "yesterday"}"#).unwrap();
        assert_eq!(message.internal_timestamp(), None);
        assert!(message.attachment_descriptors().is_empty());
    }

    #[test]
    fn test_listing_reads_ids_only() {
        let listing: ListMessagesResponse = serde_json::from_str(
            r#"{"messages": [{"id": "a", "threadId": "t"}, {"id": "b"}], "nextPageToken": "p2", "resultSizeEstimate": 2}"#,
        )
        .unwrap();
        let ids: Vec<_> = listing.messages.into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["a", "b"]);

        let empty: ListMessagesResponse =
            serde_json::from_str(r#"{"resultSizeEstimate": 0}"#).unwrap();
        assert!(empty.messages.is_empty());
    }

    #[test]
    fn test_message_without_id_parses() {
        let message: Message = serde_json::from_str(
            r#"{"internalDate": "5", "payload": {"filename": "x.csv", "body": {"attachmentId": "h"}}}"#,
        )
        .unwrap();
        assert_eq!(message.internal_timestamp(), Some(5));
        assert_eq!(
            message.attachment_descriptors(),
            vec![AttachmentDescriptor::new("x.csv", "h")]
        );
    }
}
