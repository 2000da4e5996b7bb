//! OpenAPI document served under `/api-docs/openapi.json` and browsable at `/docs`.
//! The `*Doc` types mirror the wire shapes; handlers do not use them directly.

use utoipa::OpenApi;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct UserDoc {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub biography: String,
}

/// `biography` may also be sent as `bio`. Any `id` is ignored.
#[derive(ToSchema)]
pub struct UserInputDoc {
    /// 2 to 20 characters
    pub first_name: String,
    /// 2 to 20 characters
    pub last_name: String,
    /// 20 to 450 characters
    pub biography: String,
}

#[derive(ToSchema)]
pub struct UserEnvelopeDoc { pub data: UserDoc }

#[derive(ToSchema)]
pub struct UsersEnvelopeDoc { pub data: Vec<UserDoc> }

#[derive(ToSchema)]
pub struct ErrorEnvelopeDoc { pub error: String }

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::users::create_user,
        crate::routes::users::get_user,
        crate::routes::users::list_users,
        crate::routes::users::update_user,
        crate::routes::users::delete_user,
    ),
    components(
        schemas(
            HealthResponse,
            UserDoc,
            UserInputDoc,
            UserEnvelopeDoc,
            UsersEnvelopeDoc,
            ErrorEnvelopeDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "users")
    )
)]
pub struct ApiDoc;
