use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use derive_more::Display;
use serde_json::json;

/// Failure taxonomy surfaced by the attendance core.
///
/// Every variant maps to one HTTP status; callers never retry on our
/// behalf, a failed storage call is returned as-is.
#[derive(Debug, Display)]
pub enum ApiError {
    /// Malformed input rejected at the boundary (bad timestamp, unknown
    /// event type, empty payload).
    #[display(fmt = "{}", _0)]
    Validation(String),

    /// An event arrived for a day that has no CHECK_IN yet.
    #[display(fmt = "Must check in first")]
    InvalidSequence,

    /// A referenced entity does not exist. Carries the entity name.
    #[display(fmt = "{} not found", _0)]
    NotFound(&'static str),

    /// Database failure, not locally recoverable.
    #[display(fmt = "storage failure: {}", _0)]
    Storage(sqlx::Error),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::InvalidSequence => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            ApiError::Storage(e) => {
                tracing::error!(error = %e, "storage failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "error": message }))
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(e: sqlx::Error) -> Self {
        ApiError::Storage(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ApiError::Validation("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ApiError::InvalidSequence.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::NotFound("Employee").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::Storage(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn user_facing_messages() {
        assert_eq!(ApiError::InvalidSequence.to_string(), "Must check in first");
        assert_eq!(ApiError::NotFound("Department").to_string(), "Department not found");
    }
}
