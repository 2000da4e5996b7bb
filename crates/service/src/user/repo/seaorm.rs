use async_trait::async_trait;
use sea_orm::DatabaseConnection;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::user::domain::{User, UserFields};
use crate::user::repository::UserRepository;

/// Postgres-backed repository over the `users` table.
pub struct SeaOrmUserRepository {
    pub db: DatabaseConnection,
}

impl SeaOrmUserRepository {
    pub fn new(db: DatabaseConnection) -> Self { Self { db } }
}

#[async_trait]
impl UserRepository for SeaOrmUserRepository {
    async fn create(&self, fields: UserFields) -> Result<User, ServiceError> {
        let created = models::user::create(&self.db, fields.first_name(), fields.last_name(), fields.biography()).await?;
        Ok(created.into())
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(models::user::find(&self.db, id).await?.map(User::from))
    }

    async fn list(&self) -> Result<Vec<User>, ServiceError> {
        let rows = models::user::list(&self.db).await?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update(&self, id: Uuid, fields: UserFields) -> Result<Option<User>, ServiceError> {
        let updated = models::user::replace(&self.db, id, fields.first_name(), fields.last_name(), fields.biography()).await?;
        Ok(updated.map(User::from))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        Ok(models::user::delete(&self.db, id).await?.map(User::from))
    }
}
