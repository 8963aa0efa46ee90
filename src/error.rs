use axum::extract::multipart::MultipartError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

/// Everything a request can fail with. All variants are caught at the
/// handler boundary and rendered as `{"error": message}`; only validation
/// failures get a client-error status.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Caller input was malformed or out of range.
    #[error("{0}")]
    Validation(String),
    /// Required deployment configuration is absent or unusable.
    #[error("{0}")]
    Configuration(String),
    /// The video platform rejected or failed the transfer.
    #[error("{0}")]
    Upload(String),
    /// Anything unexpected.
    #[error("{0}")]
    Internal(String),
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Configuration(_) | ApiError::Upload(_) | ApiError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::debug!(error = %self, "rejected request");
        }
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::Validation(format!("Invalid multipart payload: {err}"))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Upload(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_validation_maps_to_a_client_error() {
        assert_eq!(
            ApiError::Validation("bad topic".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Configuration("missing".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Upload("quota".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::Internal("boom".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_is_the_bare_message() {
        assert_eq!(ApiError::Upload("quota exceeded".into()).to_string(), "quota exceeded");
    }
}
