use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use service::user::UserInput;
use tracing::info;
use uuid::Uuid;

use crate::envelope::{Envelope, Reply};
use crate::errors::{ApiError, StorageOp};
use crate::extract::JsonBody;
use crate::state::AppState;

/// Path extraction is taken as a `Result` so that undecodable segments reach
/// the handler and are reported through the envelope, after any body check.
type RawId = Result<Path<String>, PathRejection>;

fn parse_id(raw: RawId) -> Result<Uuid, ApiError> {
    let Path(raw) = raw.map_err(|rejection| ApiError::InvalidIdentifier(rejection.body_text()))?;
    Uuid::parse_str(&raw).map_err(|_| ApiError::InvalidIdentifier(raw))
}

#[utoipa::path(
    post, path = "/user", tag = "users",
    request_body = crate::openapi::UserInputDoc,
    responses(
        (status = 201, description = "Created", body = crate::openapi::UserEnvelopeDoc),
        (status = 400, description = "Field length out of bounds", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 413, description = "Body too large", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 422, description = "Body is not valid JSON", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 500, description = "User creation failed", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn create_user(
    State(state): State<AppState>,
    JsonBody(input): JsonBody<UserInput>,
) -> Result<Reply, ApiError> {
    let fields = input.validate().map_err(ApiError::during(StorageOp::Create))?;
    let user = state.users.create(fields).await.map_err(ApiError::during(StorageOp::Create))?;
    Ok(Reply::created(Envelope::user(user)))
}

#[utoipa::path(
    get, path = "/user/{id}", tag = "users",
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (status = 200, description = "OK", body = crate::openapi::UserEnvelopeDoc),
        (status = 400, description = "Invalid UUID", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "User not found", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn get_user(State(state): State<AppState>, raw_id: RawId) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id)?;
    let user = state.users.get(id).await.map_err(ApiError::during(StorageOp::Get))?;
    Ok(Reply::ok(Envelope::user(user)))
}

#[utoipa::path(
    get, path = "/users", tag = "users",
    responses(
        (status = 200, description = "All users, possibly empty", body = crate::openapi::UsersEnvelopeDoc),
        (status = 500, description = "Could not list users", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn list_users(State(state): State<AppState>) -> Result<Reply, ApiError> {
    let users = state.users.list().await.map_err(ApiError::during(StorageOp::List))?;
    info!(count = users.len(), "list users");
    Ok(Reply::ok(Envelope::users(users)))
}

/// Full replace. The body is checked before the id so a bad body wins over a bad id.
#[utoipa::path(
    put, path = "/user/{id}", tag = "users",
    params(("id" = String, Path, description = "User id (UUID)")),
    request_body = crate::openapi::UserInputDoc,
    responses(
        (status = 200, description = "Updated", body = crate::openapi::UserEnvelopeDoc),
        (status = 400, description = "Invalid UUID or field length out of bounds", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "User not found", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 413, description = "Body too large", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 422, description = "Body is not valid JSON", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 500, description = "User update failed", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn update_user(
    State(state): State<AppState>,
    raw_id: RawId,
    JsonBody(input): JsonBody<UserInput>,
) -> Result<Reply, ApiError> {
    let fields = input.validate().map_err(ApiError::during(StorageOp::Update))?;
    let id = parse_id(raw_id)?;
    let user = state.users.update(id, fields).await.map_err(ApiError::during(StorageOp::Update))?;
    Ok(Reply::ok(Envelope::user(user)))
}

#[utoipa::path(
    delete, path = "/user/{id}", tag = "users",
    params(("id" = String, Path, description = "User id (UUID)")),
    responses(
        (status = 200, description = "Deleted; the removed user is returned", body = crate::openapi::UserEnvelopeDoc),
        (status = 400, description = "Invalid UUID", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 404, description = "User not found", body = crate::openapi::ErrorEnvelopeDoc),
        (status = 500, description = "Could not delete user", body = crate::openapi::ErrorEnvelopeDoc)
    )
)]
pub async fn delete_user(State(state): State<AppState>, raw_id: RawId) -> Result<Reply, ApiError> {
    let id = parse_id(raw_id)?;
    let user = state.users.delete(id).await.map_err(ApiError::during(StorageOp::Delete))?;
    Ok(Reply::ok(Envelope::user(user)))
}
