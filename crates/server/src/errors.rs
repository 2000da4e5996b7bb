use std::fmt;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use service::errors::ServiceError;
use service::user::UserField;
use thiserror::Error;
use tracing::error;

use crate::envelope::{send_json, Envelope, FALLBACK_MESSAGE};

/// The storage call that was in flight when something failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageOp {
    Create,
    Get,
    List,
    Update,
    Delete,
}

impl fmt::Display for StorageOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StorageOp::Create => "create",
            StorageOp::Get => "get",
            StorageOp::List => "list",
            StorageOp::Update => "update",
            StorageOp::Delete => "delete",
        };
        f.write_str(s)
    }
}

/// Everything a user endpoint can fail with. Converted to a status code and
/// an `{"error": ...}` envelope at the handler boundary.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("request body exceeds the size limit")]
    InputTooLarge,
    #[error("request body is not valid JSON: {0}")]
    MalformedJson(String),
    #[error("{field} must have between {min} and {max} characters")]
    Validation { field: UserField, min: usize, max: usize },
    #[error("`{0}` is not a valid user id")]
    InvalidIdentifier(String),
    #[error("user not found")]
    NotFound,
    #[error("storage failure during {op}: {source}")]
    Storage { op: StorageOp, source: ServiceError },
    #[error("could not read request body: {0}")]
    BodyRead(String),
    #[error("request exceeded the configured timeout")]
    Timeout,
}

impl ApiError {
    /// Map a service failure, remembering which storage call produced it.
    pub fn during(op: StorageOp) -> impl Fn(ServiceError) -> ApiError {
        move |err| match err {
            ServiceError::Validation { field, min, max } => ApiError::Validation { field, min, max },
            ServiceError::NotFound(_) => ApiError::NotFound,
            other => ApiError::Storage { op, source: other },
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InputTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::MalformedJson(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Validation { .. } | ApiError::InvalidIdentifier(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Storage { .. } | ApiError::BodyRead(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Client-facing text. Never includes storage or decoder detail.
    pub fn public_message(&self) -> &'static str {
        match self {
            ApiError::InputTooLarge => "Body too large.",
            ApiError::MalformedJson(_) => "Invalid body.",
            ApiError::Validation { field: UserField::Biography, .. } => {
                "Biography must have between 20 to 450 characters."
            }
            ApiError::Validation { field: UserField::FirstName, .. } => {
                "First name must have between 2 to 20 characters."
            }
            ApiError::Validation { field: UserField::LastName, .. } => {
                "Last name must have between 2 to 20 characters."
            }
            ApiError::InvalidIdentifier(_) => "Invalid UUID.",
            ApiError::NotFound => "User not found.",
            ApiError::Timeout => "Request timed out.",
            ApiError::Storage { op: StorageOp::Create, .. } => "User creation failed.",
            ApiError::Storage { op: StorageOp::List, .. } => "Could not list users.",
            ApiError::Storage { op: StorageOp::Update, .. } => "User update failed.",
            ApiError::Storage { op: StorageOp::Delete, .. } => "Could not delete user.",
            ApiError::Storage { op: StorageOp::Get, .. } | ApiError::BodyRead(_) => FALLBACK_MESSAGE,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        }
        send_json(status, &Envelope::error(self.public_message()))
    }
}
