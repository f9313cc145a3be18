//! SQLite storage implementation for users and their profiles.

mod model;
mod repository;

pub use model::{ProfileDB, UserDB};
pub use repository::UserRepository;
