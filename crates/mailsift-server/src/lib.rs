//! mailsift-server - REST API server for mailsift.
//!
//! Exposes the attachment pipeline's selection strategies over HTTP.
//!
//! # Example
//!
//! ```ignore
//! use mailsift_server::{create_pipeline, create_server, AppState};
//!
//! #[tokio::main]
//! async fn main() {
//!     let config = mailsift_core::SiftConfig::from_env();
//!     let state = AppState::new(create_pipeline(&config).unwrap());
//!     let app = create_server(state);
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:8080").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```

pub mod error;
pub mod factory;
pub mod middleware;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use factory::create_pipeline;
pub use state::AppState;

use axum::{middleware as axum_middleware, Router};
use tower_http::trace::TraceLayer;

/// Create the server with all routes and middleware.
pub fn create_server(state: AppState) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}

/// Create the server with authentication middleware.
pub fn create_server_with_auth(state: AppState) -> Router {
    routes::create_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(middleware::cors_layer())
        .layer(axum_middleware::from_fn(middleware::auth_middleware))
        .layer(axum_middleware::from_fn(middleware::logging_middleware))
}
