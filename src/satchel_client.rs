use crate::credentials::Credential;
use crate::errors::AppError;
use crate::models::{CalendarTasksResponse, TimetableResponse};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::de::DeserializeOwned;
use std::time::Duration;
use url::Url;

/// Media type Satchel One expects for the v2021.5 API.
pub const SATCHEL_ACCEPT: &str = "application/smhw.v2021.5+json";

/// Client for the Satchel One (Show My Homework) API.
///
/// Holds no credentials of its own: every call is made with the credential the
/// widget sent on that request.
#[derive(Clone)]
pub struct SatchelClient {
    client: reqwest::Client,
    base_url: String,
}

impl SatchelClient {
    /// Creates a new `SatchelClient`.
    ///
    /// # Arguments
    ///
    /// * `base_url` - The base URL of the Satchel One API (no trailing slash).
    /// * `timeout` - Per-request timeout.
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, AppError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::InternalError(format!("Failed to create Satchel One client: {}", e))
            })?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Gets the student's timetable.
    pub async fn get_timetable(&self, cred: &Credential) -> Result<TimetableResponse, AppError> {
        let url = self.endpoint(&[
            "timetable",
            "school",
            &cred.school_id,
            "student",
            &cred.user_id,
        ])?;
        tracing::info!(
            "Fetching timetable from Satchel One for school {} student {}",
            cred.school_id,
            cred.user_id
        );

        self.get_json(url, cred).await
    }

    /// Gets the student's personal calendar tasks (homework).
    pub async fn get_calendar_tasks(
        &self,
        cred: &Credential,
    ) -> Result<CalendarTasksResponse, AppError> {
        let url = self.endpoint(&["personal_calendar_tasks"])?;
        tracing::info!(
            "Fetching personal calendar tasks from Satchel One for student {}",
            cred.user_id
        );

        self.get_json(url, cred).await
    }

    /// Builds `{base_url}/{segments...}`, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::InternalError(format!("Invalid Satchel One URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| {
                AppError::InternalError("Satchel One URL cannot be a base".to_string())
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        cred: &Credential,
    ) -> Result<T, AppError> {
        tracing::debug!("Satchel One GET {}", url);

        let response = self
            .client
            .get(url)
            .header(AUTHORIZATION, cred.bearer_header())
            .header(ACCEPT, SATCHEL_ACCEPT)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::UpstreamError {
                status: Some(status),
                message: error_text,
            });
        }

        // Body read errors (including the client timeout firing mid-body) go
        // through `From<reqwest::Error>`; only decode failures are parse errors.
        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| AppError::UpstreamError {
            status: None,
            message: format!("Failed to parse Satchel One response: {}", e),
        })
    }
}
