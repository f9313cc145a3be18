//! SQLite storage implementation for per-user settings.

mod model;
mod repository;

pub use model::UserSettingsDB;
pub use repository::SettingsRepository;
