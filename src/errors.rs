use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use std::fmt;

/// Application-specific error types.
#[derive(Debug, Clone)]
pub enum AppError {
    /// One of the credential headers is absent or blank.
    MissingCredential(String),
    /// Satchel One answered with a non-success status, or could not be reached or parsed.
    UpstreamError {
        /// Upstream HTTP status, when a response was received.
        status: Option<StatusCode>,
        /// Upstream message or transport error description.
        message: String,
    },
    /// Satchel One did not answer within the client timeout.
    UpstreamTimeout(String),
    /// Internal server error.
    InternalError(String),
    /// Error with context chain for better debugging.
    WithContext {
        /// The underlying source of the error.
        source: Box<AppError>,
        /// Additional context message.
        context: String,
    },
}

impl fmt::Display for AppError {
    /// Formats the error for display.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::MissingCredential(msg) => write!(f, "Missing credential: {}", msg),
            AppError::UpstreamError {
                status: Some(status),
                message,
            } => write!(f, "Satchel One returned {}: {}", status, message),
            AppError::UpstreamError {
                status: None,
                message,
            } => write!(f, "Satchel One request failed: {}", message),
            AppError::UpstreamTimeout(msg) => write!(f, "Satchel One timed out: {}", msg),
            AppError::InternalError(msg) => write!(f, "Internal error: {}", msg),
            AppError::WithContext { source, context } => {
                write!(f, "{}: {}", context, source)
            }
        }
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// HTTP status reported to the widget.
    ///
    /// Upstream client errors (401, 403, 404, 429, ...) pass straight through so the
    /// widget can tell a revoked token apart from an outage. Upstream server errors
    /// and transport failures become 502.
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::MissingCredential(_) => StatusCode::BAD_REQUEST,
            AppError::UpstreamError {
                status: Some(status),
                ..
            } if status.is_client_error() => *status,
            AppError::UpstreamError { .. } => StatusCode::BAD_GATEWAY,
            AppError::UpstreamTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::WithContext { source, .. } => source.status_code(),
        }
    }

    /// Message placed in the `error` field of the response body.
    pub fn public_message(&self) -> String {
        match self {
            AppError::InternalError(_) => "Internal server error".to_string(),
            AppError::WithContext { source, context } => {
                format!("{}: {}", context, source.public_message())
            }
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    /// Converts the error into an HTTP response.
    ///
    /// Maps each error variant to an appropriate HTTP status code and JSON body.
    /// Logs errors appropriately based on their severity.
    fn into_response(self) -> Response {
        let status = self.status_code();

        match &self {
            AppError::MissingCredential(msg) => {
                tracing::warn!("Rejected widget request: {}", msg);
            }
            AppError::InternalError(msg) => {
                tracing::error!("Internal error: {}", msg);
            }
            // Log full context chain for debugging
            other => {
                tracing::error!("Upstream failure ({}): {}", status, other);
            }
        }

        let body = Json(json!({
            "status": "error",
            "error": self.public_message(),
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    /// Converts a `reqwest::Error` into an `AppError`.
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::UpstreamTimeout(err.to_string())
        } else {
            AppError::UpstreamError {
                status: err.status(),
                message: err.to_string(),
            }
        }
    }
}

/// Extension trait for adding context to errors.
/// Similar to `anyhow::Context` but for our `AppError` type.
pub trait ResultExt<T> {
    /// Add context to an error.
    ///
    /// # Arguments
    ///
    /// * `context` - The context message to add.
    fn context(self, context: impl Into<String>) -> Result<T, AppError>;
}

impl<T> ResultExt<T> for Result<T, AppError> {
    fn context(self, context: impl Into<String>) -> Result<T, AppError> {
        self.map_err(|e| AppError::WithContext {
            source: Box::new(e),
            context: context.into(),
        })
    }
}
