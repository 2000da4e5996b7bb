//! User resource: domain types, the storage trait with its two adapters, and
//! the service the HTTP layer talks to.

pub mod domain;
pub mod repository;
pub mod repo;
pub mod service;

pub use domain::{User, UserField, UserFields, UserInput};
pub use repository::UserRepository;
pub use service::UserService;
