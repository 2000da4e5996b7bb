use async_trait::async_trait;
use uuid::Uuid;

use super::domain::{User, UserFields};
use crate::errors::ServiceError;

/// Storage capability shared by the relational and in-memory adapters.
///
/// Lookups by id report absence as `None`; `Err` is reserved for storage failures.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Persist a new user under a freshly generated id.
    async fn create(&self, fields: UserFields) -> Result<User, ServiceError>;
    async fn get(&self, id: Uuid) -> Result<Option<User>, ServiceError>;
    /// Every stored user, in no particular order.
    async fn list(&self) -> Result<Vec<User>, ServiceError>;
    /// Overwrite all fields of an existing user, keeping its id.
    async fn update(&self, id: Uuid, fields: UserFields) -> Result<Option<User>, ServiceError>;
    /// Remove a user and return what was stored.
    async fn delete(&self, id: Uuid) -> Result<Option<User>, ServiceError>;
}
