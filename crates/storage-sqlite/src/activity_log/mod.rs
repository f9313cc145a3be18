//! SQLite storage implementation for the activity log.

mod model;
mod repository;

pub use model::ActivityDB;
pub use repository::ActivityRepository;
