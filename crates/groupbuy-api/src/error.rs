use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use groupbuy_core::RowError;
use groupbuy_core::access::AccessError;

/// Every failure the /api surface can report. All of them serialize as
/// `{"success": false, "message": ...}` with the status below.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("only the form owner may do this")]
    Forbidden,
    #[error("row index out of range")]
    InvalidIndex,
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("{0}")]
    Unauthorized(String),
    #[error("reset link has expired")]
    TokenExpired,
    #[error("invalid reset link")]
    TokenInvalid,
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::InvalidIndex | ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::TokenExpired | ApiError::TokenInvalid => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match &self {
            ApiError::Internal(e) => {
                error!("internal error: {:#}", e);
                "internal server error".to_string()
            }
            other => other.to_string(),
        };
        (status, Json(json!({ "success": false, "message": message }))).into_response()
    }
}

impl From<AccessError> for ApiError {
    fn from(_: AccessError) -> Self {
        ApiError::Forbidden
    }
}

impl From<RowError> for ApiError {
    fn from(_: RowError) -> Self {
        ApiError::InvalidIndex
    }
}

/// Reject missing payload fields with a 400 naming the field.
pub fn required<T>(value: Option<T>, name: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::Validation(format!("missing {}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_match_taxonomy() {
        assert_eq!(ApiError::NotFound("form").status(), StatusCode::NOT_FOUND);
        assert_eq!(ApiError::Forbidden.status(), StatusCode::FORBIDDEN);
        assert_eq!(ApiError::InvalidIndex.status(), StatusCode::BAD_REQUEST);
        assert_eq!(ApiError::TokenExpired.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Conflict("email already registered".into()).status(),
            StatusCode::CONFLICT
        );
    }

    #[test]
    fn required_names_the_field() {
        let err = required(None::<String>, "form_id").unwrap_err();
        assert!(matches!(err, ApiError::Validation(m) if m == "missing form_id"));
    }
}
