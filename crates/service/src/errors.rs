use thiserror::Error;

use crate::user::domain::UserField;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation error: {field} must have between {min} and {max} characters")]
    Validation { field: UserField, min: usize, max: usize },
    #[error("not found: {0}")]
    NotFound(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}
