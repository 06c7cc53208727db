use crate::config::Config;
use crate::credentials::Credential;
use crate::errors::{AppError, ResultExt};
use crate::satchel_client::SatchelClient;
use crate::schedule;
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::DateTime;
use chrono_tz::Tz;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

/// Shared application state injected into handlers.
///
/// Read-only after startup; requests never share anything mutable.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Config,
    /// Client for the Satchel One API.
    pub satchel: SatchelClient,
    /// Source of "now" in London time.
    pub clock: fn() -> DateTime<Tz>,
}

impl AppState {
    /// Builds the state from configuration, using the system clock.
    pub fn new(config: Config) -> Result<Self, AppError> {
        let satchel = SatchelClient::new(
            config.satchel_base_url.clone(),
            Duration::from_secs(config.satchel_timeout_secs),
        )?;

        Ok(Self {
            config,
            satchel,
            clock: schedule::london_now,
        })
    }

    /// Replaces the clock, for pinning "now" in tests.
    pub fn with_clock(mut self, clock: fn() -> DateTime<Tz>) -> Self {
        self.clock = clock;
        self
    }
}

/// Health check endpoint.
///
/// Returns the service status, version, and health information.
pub async fn health() -> (StatusCode, Json<serde_json::Value>) {
    (
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// GET /widget
///
/// Relays the caller's Satchel One credentials upstream and returns the flat
/// widget document.
///
/// Expected headers:
/// - `Authorization`: raw token, or `Bearer <token>`
/// - `X-User-Id`: Satchel One student id
/// - `X-School-Id`: Satchel One school id
///
/// # Returns
///
/// * `Result<Response, AppError>` - 200 with the widget payload and no-cache headers,
///   or an error response. No upstream call is made when a header is missing.
pub async fn widget(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let cred = Credential::from_headers(&headers)?;
    tracing::info!(
        "GET /widget - school {} student {}",
        cred.school_id,
        cred.user_id
    );

    // Request time, not response time
    let now = (state.clock)();

    let (timetable, tasks) = tokio::try_join!(
        async {
            state
                .satchel
                .get_timetable(&cred)
                .await
                .context("Failed to fetch timetable")
        },
        async {
            state
                .satchel
                .get_calendar_tasks(&cred)
                .await
                .context("Failed to fetch homework")
        },
    )?;

    let payload = schedule::build_payload(now, &timetable, &tasks);

    tracing::info!(
        "✓ Widget payload built: current={:?}, next={:?}, homework={}, refresh={}s",
        payload.current_lesson.as_ref().map(|l| l.subject.as_str()),
        payload.next_lesson.as_ref().map(|l| l.subject.as_str()),
        payload.homework.len(),
        payload.refresh_seconds
    );

    Ok((
        StatusCode::OK,
        [
            (
                header::CACHE_CONTROL,
                "no-store, no-cache, must-revalidate, max-age=0",
            ),
            (header::PRAGMA, "no-cache"),
            (header::EXPIRES, "0"),
        ],
        Json(payload),
    )
        .into_response())
}
