//! Service layer for the user registry.
//! - Validation of client input (`user::domain`).
//! - One storage trait with Postgres and in-memory adapters (`user::repo`).
//! - `UserService`, which the HTTP layer calls.

pub mod errors;
pub mod user;
#[cfg(test)]
pub mod test_support;
