use axum::{Json, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use serde_json::{Value, json};
use std::time::Duration;
use thiserror::Error as ThisError;

use super::engine::EngineError;
use super::registry::RegistryError;

#[derive(Debug, ThisError)]
pub enum ProvisionError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("database `{0}` already exists")]
    DuplicateDatabase(String),

    #[error("database `{0}` does not exist")]
    UnknownDatabase(String),

    #[error("another operation on database `{0}` is in progress")]
    OperationInProgress(String),

    #[error("engine connect failure: {0}")]
    ConnectFailure(String),

    #[error("engine execution failure: {0}")]
    ExecFailure(String),

    #[error("{operation} timed out after {timeout:?}")]
    Timeout {
        operation: &'static str,
        timeout: Duration,
    },

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Ractor error: {0}")]
    RactorError(String),
}

impl ProvisionError {
    /// Stable machine-readable kind carried in the error body.
    pub fn code(&self) -> &'static str {
        match self {
            ProvisionError::InvalidRequest(_) => "INVALID_REQUEST",
            ProvisionError::DuplicateDatabase(_) => "DUPLICATE_DATABASE",
            ProvisionError::UnknownDatabase(_) => "UNKNOWN_DATABASE",
            ProvisionError::OperationInProgress(_) => "OPERATION_IN_PROGRESS",
            ProvisionError::ConnectFailure(_) => "CONNECT_FAILURE",
            ProvisionError::ExecFailure(_) => "EXEC_FAILURE",
            ProvisionError::Timeout { .. } => "TIMEOUT",
            ProvisionError::Registry(_) | ProvisionError::RactorError(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ProvisionError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ProvisionError::UnknownDatabase(_) => StatusCode::NOT_FOUND,
            ProvisionError::DuplicateDatabase(_) | ProvisionError::OperationInProgress(_) => {
                StatusCode::CONFLICT
            }
            ProvisionError::ConnectFailure(_) | ProvisionError::ExecFailure(_) => {
                StatusCode::BAD_GATEWAY
            }
            ProvisionError::Timeout { .. } => StatusCode::GATEWAY_TIMEOUT,
            ProvisionError::Registry(_) | ProvisionError::RactorError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<EngineError> for ProvisionError {
    fn from(e: EngineError) -> Self {
        match e {
            EngineError::UnsupportedEngine(_)
            | EngineError::Connect(_)
            | EngineError::Unreachable(_) => ProvisionError::ConnectFailure(e.to_string()),
            EngineError::Exec(_) => ProvisionError::ExecFailure(e.to_string()),
        }
    }
}

impl IntoResponse for ProvisionError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status();
        let code = self.code().to_string();
        let (message, details) = match &self {
            ProvisionError::Registry(_) | ProvisionError::RactorError(_) => {
                ("An internal server error occurred.".to_string(), None)
            }
            ProvisionError::Timeout { operation, timeout } => (
                self.to_string(),
                Some(json!({
                    "operation": operation,
                    "timeout_ms": u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                })),
            ),
            other => (other.to_string(), None),
        };
        let body = ApiErrorObject {
            code,
            message,
            details,
        };
        (status, Json(ApiErrorBody { inner: body })).into_response()
    }
}

/// Standardized API error response payload.
#[derive(Serialize)]
pub struct ApiErrorObject {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

#[derive(Serialize)]
pub struct ApiErrorBody {
    #[serde(rename = "error")]
    pub inner: ApiErrorObject,
}
