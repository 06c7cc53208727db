//! Satchel One Widget Relay Library
//!
//! This library relays a desktop widget's Satchel One credentials to the
//! Satchel One API and reshapes the timetable and homework responses into the
//! flat JSON document the widget renders.
//!
//! # Modules
//!
//! - `config`: Configuration management.
//! - `credentials`: Per-request credential extraction from headers.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers.
//! - `models`: Satchel One and widget data models.
//! - `satchel_client`: Satchel One API client.
//! - `schedule`: Lesson, homework and refresh selection.

pub mod config;
pub mod credentials;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod satchel_client;
pub mod schedule;

use axum::{routing::get, Router};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::AppState;

/// Routes that carry credentials and reach Satchel One.
pub fn widget_routes() -> Router<Arc<AppState>> {
    Router::new().route("/widget", get(handlers::widget))
}

/// Builds the application router.
///
/// The binary passes `widget_routes()` wrapped in the per-IP rate limiter; tests
/// pass them bare. The health check is never rate limited.
pub fn app(state: Arc<AppState>, widget_routes: Router<Arc<AppState>>) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .merge(widget_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
