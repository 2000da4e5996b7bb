use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use super::domain::{User, UserFields};
use super::repository::UserRepository;
use crate::errors::ServiceError;

/// Application service for the user resource.
///
/// Callers pass [`UserFields`], so validation has already happened by the time
/// a repository is touched. Absence is turned into [`ServiceError::NotFound`].
#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
}

impl UserService {
    pub fn new(repo: Arc<dyn UserRepository>) -> Self { Self { repo } }

    #[instrument(skip_all)]
    pub async fn create(&self, fields: UserFields) -> Result<User, ServiceError> {
        let user = self.repo.create(fields).await?;
        info!(user_id = %user.id, "user_created");
        Ok(user)
    }

    pub async fn get(&self, id: Uuid) -> Result<User, ServiceError> {
        self.repo.get(id).await?.ok_or_else(|| ServiceError::not_found("user"))
    }

    pub async fn list(&self) -> Result<Vec<User>, ServiceError> {
        self.repo.list().await
    }

    #[instrument(skip(self, values), fields(user_id = %id))]
    pub async fn update(&self, id: Uuid, values: UserFields) -> Result<User, ServiceError> {
        let user = self.repo.update(id, values).await?.ok_or_else(|| ServiceError::not_found("user"))?;
        info!("user_updated");
        Ok(user)
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete(&self, id: Uuid) -> Result<User, ServiceError> {
        let user = self.repo.delete(id).await?.ok_or_else(|| ServiceError::not_found("user"))?;
        info!("user_deleted");
        Ok(user)
    }
}
