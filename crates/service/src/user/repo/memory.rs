use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::errors::ServiceError;
use crate::user::domain::{User, UserFields};
use crate::user::repository::UserRepository;

/// Process-local repository. Contents are lost on restart.
///
/// Cloning shares the same map. Every read or write holds the lock for the
/// whole operation, so an update's existence check and write cannot interleave
/// with another request.
#[derive(Clone, Default)]
pub struct InMemoryUserRepository {
    inner: Arc<RwLock<HashMap<Uuid, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self { Self::default() }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.read().await.len()
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn create(&self, fields: UserFields) -> Result<User, ServiceError> {
        let mut map = self.inner.write().await;
        let mut id = Uuid::new_v4();
        while map.contains_key(&id) {
            id = Uuid::new_v4();
        }
        let user = fields.into_user(id);
        map.insert(id, user.clone());
        Ok(user)
    }

    async fn get(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.get(&id).cloned())
    }

    async fn list(&self) -> Result<Vec<User>, ServiceError> {
        let map = self.inner.read().await;
        Ok(map.values().cloned().collect())
    }

    async fn update(&self, id: Uuid, fields: UserFields) -> Result<Option<User>, ServiceError> {
        let mut map = self.inner.write().await;
        let Some(existing) = map.get_mut(&id) else { return Ok(None) };
        *existing = fields.into_user(id);
        Ok(Some(existing.clone()))
    }

    async fn delete(&self, id: Uuid) -> Result<Option<User>, ServiceError> {
        let mut map = self.inner.write().await;
        Ok(map.remove(&id))
    }
}
