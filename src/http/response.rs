use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{json, Value};

use crate::utils::error::FleetError;

/// `{ success: true, message?, data }`
pub fn success<T: Serialize>(status: StatusCode, message: Option<&str>, data: T) -> Response {
    let mut body = json!({ "success": true, "data": data });
    if let Some(message) = message {
        body["message"] = Value::String(message.to_string());
    }
    (status, Json(body)).into_response()
}

/// Boundary wrapper that renders a `FleetError` as the failure envelope.
#[derive(Debug)]
pub struct ApiError(pub FleetError);

impl From<FleetError> for ApiError {
    fn from(err: FleetError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.0.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    pub fn body(&self) -> Value {
        match &self.0 {
            FleetError::StoreValidationError { errors } => json!({
                "success": false,
                "message": "Validation error",
                "errors": errors,
                "kind": self.0.kind(),
            }),
            err => json!({
                "success": false,
                "message": err.user_friendly_message(),
                "error": err.to_string(),
                "kind": err.kind(),
            }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(kind = self.0.kind(), "Request failed: {}", self.0);
        } else {
            tracing::warn!(kind = self.0.kind(), "Request rejected: {}", self.0);
        }
        (status, Json(self.body())).into_response()
    }
}
