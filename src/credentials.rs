use crate::errors::AppError;
use axum::http::HeaderMap;
use std::fmt;

/// Caller-supplied Satchel One credentials, valid for a single request.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub token: String,
    pub user_id: String,
    pub school_id: String,
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("token", &"[REDACTED]")
            .field("user_id", &self.user_id)
            .field("school_id", &self.school_id)
            .finish()
    }
}

impl Credential {
    /// Extracts the credential from the widget's request headers.
    ///
    /// Requires `Authorization`, `X-User-Id` (or `user-id`) and `X-School-Id`
    /// (or `school-id`), each non-blank after trimming.
    pub fn from_headers(headers: &HeaderMap) -> Result<Self, AppError> {
        let token = header_value(headers, &["authorization"]);
        let user_id = header_value(headers, &["x-user-id", "user-id"]);
        let school_id = header_value(headers, &["x-school-id", "school-id"]);

        match (token, user_id, school_id) {
            (Some(token), Some(user_id), Some(school_id)) => Ok(Self {
                token,
                user_id,
                school_id,
            }),
            (token, user_id, school_id) => {
                let missing: Vec<&str> = [
                    ("Authorization", token.is_none()),
                    ("X-User-Id", user_id.is_none()),
                    ("X-School-Id", school_id.is_none()),
                ]
                .into_iter()
                .filter_map(|(name, absent)| absent.then_some(name))
                .collect();

                Err(AppError::MissingCredential(format!(
                    "Missing required headers: {}",
                    missing.join(", ")
                )))
            }
        }
    }

    /// Upstream `Authorization` value. Tokens already carrying a `Bearer ` prefix
    /// are passed through as-is.
    pub fn bearer_header(&self) -> String {
        let token = self.token.trim();
        let has_prefix = token
            .get(..7)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("bearer "));
        if has_prefix {
            token.to_string()
        } else {
            format!("Bearer {}", token)
        }
    }
}

fn header_value(headers: &HeaderMap, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| headers.get(*name))
        .filter_map(|v| v.to_str().ok())
        .map(str::trim)
        .find(|v| !v.is_empty())
        .map(str::to_string)
}
