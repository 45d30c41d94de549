//! Error responses.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::install::InstallError;

/// JSON body of every error response: `{"errors": "<message>"}`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Human-readable description of the failure.
    pub errors: String,
}

impl IntoResponse for InstallError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(error = %self, "Install request failed");
        } else {
            tracing::warn!(error = %self, "Install request rejected");
        }

        let body = ErrorBody {
            errors: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}
