//! Attachment extraction endpoints.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use base64::{engine::general_purpose::STANDARD, Engine as _};
use mailsift_core::{ExtractionResult, FileType, StructuredData};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// One processed attachment.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentResponse {
    pub file_name: String,
    pub file_type: FileType,
    pub data: StructuredData,
    /// Original attachment bytes, standard base64.
    pub file_base64: String,
}

impl From<ExtractionResult> for AttachmentResponse {
    fn from(result: ExtractionResult) -> Self {
        Self {
            file_base64: STANDARD.encode(&result.raw_bytes),
            file_name: result.file_name,
            file_type: result.file_type,
            data: result.data,
        }
    }
}

fn into_response(results: Vec<ExtractionResult>) -> Json<Vec<AttachmentResponse>> {
    Json(results.into_iter().map(AttachmentResponse::from).collect())
}

/// Query parameters for the recent-messages endpoint.
#[derive(Debug, Deserialize)]
pub struct RecentQuery {
    pub max_results: Option<u32>,
}

/// Process the most recent messages.
/// GET /attachments/recent?max_results=
pub async fn recent_attachments(
    State(state): State<AppState>,
    Query(query): Query<RecentQuery>,
) -> ApiResult<Json<Vec<AttachmentResponse>>> {
    let pipeline = state.pipeline();
    let max_results = query
        .max_results
        .unwrap_or(pipeline.config().default_recent_max);

    let results = pipeline.recent(max_results).await?;
    Ok(into_response(results))
}

/// Process one message by id.
/// GET /attachments/messages/:id
pub async fn message_attachments(
    State(state): State<AppState>,
    Path(message_id): Path<String>,
) -> ApiResult<Json<Vec<AttachmentResponse>>> {
    let results = state.pipeline().by_message_id(&message_id).await?;

    if results.is_empty() {
        return Err(ApiError::not_found(format!(
            "No files found in message '{}'",
            message_id
        )));
    }

    Ok(into_response(results))
}

/// Query parameters for the subject search endpoint.
#[derive(Debug, Deserialize)]
pub struct SubjectQuery {
    #[serde(default)]
    pub subject: String,
}

/// Process the newest message whose subject contains the query.
/// GET /attachments/search?subject=
pub async fn subject_attachments(
    State(state): State<AppState>,
    Query(query): Query<SubjectQuery>,
) -> ApiResult<Json<Vec<AttachmentResponse>>> {
    let results = state.pipeline().by_subject(&query.subject).await?;

    if results.is_empty() {
        return Err(ApiError::not_found(format!(
            "No message found with a subject containing '{}'",
            query.subject
        )));
    }

    Ok(into_response(results))
}

/// Query parameters for the label endpoint.
#[derive(Debug, Deserialize)]
pub struct LabelQuery {
    #[serde(default)]
    pub label_name: String,
    pub max_results: Option<u32>,
}

/// Process the messages carrying a label.
/// GET /attachments/labels?label_name=&max_results=
pub async fn label_attachments(
    State(state): State<AppState>,
    Query(query): Query<LabelQuery>,
) -> ApiResult<Json<Vec<AttachmentResponse>>> {
    let pipeline = state.pipeline();
    let max_results = query
        .max_results
        .unwrap_or(pipeline.config().default_label_max);

    let results = pipeline.by_label(&query.label_name, max_results).await?;

    if results.is_empty() {
        return Err(ApiError::not_found(format!(
            "No files found in messages labelled '{}'",
            query.label_name
        )));
    }

    Ok(into_response(results))
}
