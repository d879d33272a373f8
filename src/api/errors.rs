use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use crate::errors::CiphertraceError;
use tracing::{error, warn};

impl CiphertraceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CiphertraceError::InvalidInput(_)
            | CiphertraceError::EmptyInput(_)
            | CiphertraceError::Config(_)
            | CiphertraceError::Yaml(_) => StatusCode::BAD_REQUEST,
            CiphertraceError::UnsupportedFile(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            CiphertraceError::UnknownTool(_) | CiphertraceError::NotFound(_) => StatusCode::NOT_FOUND,
            CiphertraceError::Cancelled(_) => StatusCode::CONFLICT,
            CiphertraceError::Authentication(_) => StatusCode::UNAUTHORIZED,
            CiphertraceError::Permission(_) => StatusCode::FORBIDDEN,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for CiphertraceError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let classification = self.classify();
        if status.is_server_error() {
            error!(error = %self, error_type = classification.error_type, "Request failed");
        } else {
            warn!(error = %self, error_type = classification.error_type, status = status.as_u16(), "Request rejected");
        }

        let body = json!({
            "error": self.to_string(),
            "type": classification.error_type,
            "notice": self.notice(),
        });
        (status, Json(body)).into_response()
    }
}
