use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use super::codes::ErrorCode;

/// Uniform response envelope returned for every request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ApiResponse {
    /// Error code for programmatic handling (0 on success)
    pub code: i32,
    /// Human-readable message
    pub message: String,
    /// Additional payload (optional)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schema(value_type = Option<Object>)]
    pub detail: Option<Value>,
    #[serde(skip)]
    status: StatusCode,
}

impl ApiResponse {
    /// Successful envelope carrying `detail` as payload
    pub fn ok(detail: impl Serialize) -> Self {
        Self {
            code: ErrorCode::Success.code(),
            message: ErrorCode::Success.message().to_string(),
            detail: serde_json::to_value(detail).ok(),
            status: StatusCode::OK,
        }
    }

    /// Failure envelope for a table entry, without detail
    pub fn fail(code: ErrorCode) -> Self {
        Self {
            code: code.code(),
            message: code.message().to_string(),
            detail: None,
            status: status_for(code),
        }
    }

    /// Failure envelope for a table entry with additional detail
    pub fn fail_with(code: ErrorCode, detail: Value) -> Self {
        Self {
            detail: Some(detail),
            ..Self::fail(code)
        }
    }

    /// Envelope for a code and message that do not come from the table
    pub fn business(
        code: i32,
        message: impl Into<String>,
        detail: Option<Value>,
        status: StatusCode,
    ) -> Self {
        Self {
            code,
            message: message.into(),
            detail,
            status,
        }
    }

    /// Override the HTTP status sent alongside the envelope
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

fn status_for(code: ErrorCode) -> StatusCode {
    StatusCode::from_u16(code.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

impl IntoResponse for ApiResponse {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
