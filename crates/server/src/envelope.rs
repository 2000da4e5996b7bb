//! The `{error?, data?}` wrapper every endpoint answers with.

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use service::user::User;
use tracing::error;

pub const FALLBACK_MESSAGE: &str = "Something went wrong.";

/// What `data` carries for a given endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Payload {
    User(User),
    Users(Vec<User>),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Envelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Payload>,
}

impl Envelope {
    pub fn user(user: User) -> Self {
        Self { error: None, data: Some(Payload::User(user)) }
    }

    pub fn users(users: Vec<User>) -> Self {
        Self { error: None, data: Some(Payload::Users(users)) }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { error: Some(message.into()), data: None }
    }
}

/// A status code plus envelope, written through [`send_json`].
#[derive(Debug)]
pub struct Reply {
    pub status: StatusCode,
    pub body: Envelope,
}

impl Reply {
    pub fn ok(body: Envelope) -> Self { Self { status: StatusCode::OK, body } }
    pub fn created(body: Envelope) -> Self { Self { status: StatusCode::CREATED, body } }
}

impl IntoResponse for Reply {
    fn into_response(self) -> Response {
        send_json(self.status, &self.body)
    }
}

/// Serialize `body` as the response. If encoding fails the client gets a 500
/// with [`FALLBACK_MESSAGE`]; the fallback path is taken at most once.
pub fn send_json<T: Serialize>(status: StatusCode, body: &T) -> Response {
    encode(status, body, true)
}

fn encode<T: Serialize>(status: StatusCode, body: &T, allow_fallback: bool) -> Response {
    match serde_json::to_vec(body) {
        Ok(bytes) => (status, [(header::CONTENT_TYPE, "application/json")], bytes).into_response(),
        Err(e) if allow_fallback => {
            error!(error = %e, status = status.as_u16(), "failed to encode response body");
            encode(StatusCode::INTERNAL_SERVER_ERROR, &Envelope::error(FALLBACK_MESSAGE), false)
        }
        Err(e) => {
            error!(error = %e, "failed to encode fallback response body");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}
