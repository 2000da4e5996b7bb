use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::ServiceError;

/// A stored user. `id` is assigned by the repository and never changes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub first_name: String,
    pub last_name: String,
    pub biography: String,
}

impl From<models::user::Model> for User {
    fn from(m: models::user::Model) -> Self {
        Self { id: m.id, first_name: m.first_name, last_name: m.last_name, biography: m.biography }
    }
}

/// The text fields a client may write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UserField {
    FirstName,
    LastName,
    Biography,
}

impl UserField {
    /// Inclusive character-count bounds.
    pub const fn bounds(self) -> (usize, usize) {
        match self {
            UserField::FirstName | UserField::LastName => (2, 20),
            UserField::Biography => (20, 450),
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            UserField::FirstName => "first_name",
            UserField::LastName => "last_name",
            UserField::Biography => "biography",
        }
    }

    fn check(self, value: &str) -> Result<(), ServiceError> {
        let (min, max) = self.bounds();
        let len = value.chars().count();
        if len < min || len > max {
            return Err(ServiceError::Validation { field: self, min, max });
        }
        Ok(())
    }
}

impl fmt::Display for UserField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request body for create and full replace, before validation.
///
/// Missing fields decode as empty strings so they fail the length checks
/// rather than the decoder. Any `id` in the body is ignored.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default, alias = "bio")]
    pub biography: String,
}

impl UserInput {
    /// Check the bounds in a fixed order: biography, first name, last name.
    pub fn validate(self) -> Result<UserFields, ServiceError> {
        UserField::Biography.check(&self.biography)?;
        UserField::FirstName.check(&self.first_name)?;
        UserField::LastName.check(&self.last_name)?;
        Ok(UserFields {
            first_name: self.first_name,
            last_name: self.last_name,
            biography: self.biography,
        })
    }
}

/// Field values that passed [`UserInput::validate`]. Repositories only accept this type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UserFields {
    first_name: String,
    last_name: String,
    biography: String,
}

impl UserFields {
    pub fn first_name(&self) -> &str { &self.first_name }
    pub fn last_name(&self) -> &str { &self.last_name }
    pub fn biography(&self) -> &str { &self.biography }

    pub fn into_user(self, id: Uuid) -> User {
        User { id, first_name: self.first_name, last_name: self.last_name, biography: self.biography }
    }
}
