use crate::core::error::AppError;
use crate::core::types::ErrorCategory;
use axum::{
    body::Body,
    http::{Response, StatusCode},
    response::{IntoResponse, Json},
};
use serde_json::json;
use std::collections::BTreeMap;

/// Messages per request field, serialized under `error.fields`.
#[derive(Debug, Default)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn push(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `Ok(())` when no field failed, otherwise a 422 rejection.
    pub fn into_result(self) -> Result<(), ApiRejection> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(ApiRejection::unprocessable(self))
        }
    }
}

/// JSON error response returned by every API route.
#[derive(Debug)]
pub struct ApiRejection {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub fields: Option<FieldErrors>,
}

impl ApiRejection {
    pub fn new(status: StatusCode, code: &str, message: impl Into<String>) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.into(),
            fields: None,
        }
    }

    pub fn bad_request(code: &str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn unprocessable(fields: FieldErrors) -> Self {
        Self {
            status: StatusCode::UNPROCESSABLE_ENTITY,
            code: "SB-VALIDATION".to_string(),
            message: "invalid request parameters".to_string(),
            fields: Some(fields),
        }
    }
}

impl From<AppError> for ApiRejection {
    fn from(err: AppError) -> Self {
        let status = match err.category {
            ErrorCategory::ValidationError
            | ErrorCategory::UnknownSpace
            | ErrorCategory::NotReachable => StatusCode::BAD_REQUEST,
            ErrorCategory::ToolExecutionError
            | ErrorCategory::TimeoutError
            | ErrorCategory::ParseError => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        if status.is_server_error() {
            tracing::error!("request failed: {}", err);
        }
        Self::new(status, &err.code, err.message)
    }
}

impl IntoResponse for ApiRejection {
    fn into_response(self) -> Response<Body> {
        let mut error = json!({
            "code": self.code,
            "message": self.message,
        });
        if let Some(fields) = self.fields {
            error["fields"] = json!(fields.0);
        }
        let mut resp = Json(json!({ "error": error })).into_response();
        *resp.status_mut() = self.status;
        resp
    }
}
