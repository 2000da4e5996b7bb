use sea_orm::{entity::prelude::*, DatabaseConnection, NotSet, Set, TransactionTrait};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ModelError;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub first_name: String,
    #[sea_orm(column_type = "Text")]
    pub last_name: String,
    #[sea_orm(column_type = "Text")]
    pub biography: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

/// Insert a row and let Postgres assign the id; the stored row is returned.
pub async fn create(db: &DatabaseConnection, first_name: &str, last_name: &str, biography: &str) -> Result<Model, ModelError> {
    let am = ActiveModel {
        id: NotSet,
        first_name: Set(first_name.to_string()),
        last_name: Set(last_name.to_string()),
        biography: Set(biography.to_string()),
    };
    Ok(am.insert(db).await?)
}

pub async fn find(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, ModelError> {
    Ok(Entity::find_by_id(id).one(db).await?)
}

pub async fn list(db: &DatabaseConnection) -> Result<Vec<Model>, ModelError> {
    Ok(Entity::find().all(db).await?)
}

/// Overwrite all text columns of an existing row. `None` when no row has `id`.
pub async fn replace(
    db: &DatabaseConnection,
    id: Uuid,
    first_name: &str,
    last_name: &str,
    biography: &str,
) -> Result<Option<Model>, ModelError> {
    let txn = db.begin().await?;
    let Some(found) = Entity::find_by_id(id).one(&txn).await? else {
        txn.rollback().await?;
        return Ok(None);
    };
    let mut am: ActiveModel = found.into();
    am.first_name = Set(first_name.to_string());
    am.last_name = Set(last_name.to_string());
    am.biography = Set(biography.to_string());
    let updated = am.update(&txn).await?;
    txn.commit().await?;
    Ok(Some(updated))
}

/// Remove a row and hand back what was stored. `None` when no row has `id`.
pub async fn delete(db: &DatabaseConnection, id: Uuid) -> Result<Option<Model>, ModelError> {
    let txn = db.begin().await?;
    let Some(found) = Entity::find_by_id(id).one(&txn).await? else {
        txn.rollback().await?;
        return Ok(None);
    };
    Entity::delete_by_id(id).exec(&txn).await?;
    txn.commit().await?;
    Ok(Some(found))
}
