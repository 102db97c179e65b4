//! Route definitions for the REST API.

mod attachments;
mod health;

use axum::{routing::get, Router};

use crate::state::AppState;

/// Create the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Attachment extraction
        .route("/attachments/recent", get(attachments::recent_attachments))
        .route("/attachments/messages/:id", get(attachments::message_attachments))
        .route("/attachments/search", get(attachments::subject_attachments))
        .route("/attachments/labels", get(attachments::label_attachments))
        // Attach state
        .with_state(state)
}

pub use attachments::*;
pub use health::*;
