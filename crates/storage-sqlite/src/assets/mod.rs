//! SQLite storage implementation for the asset inventory.

mod model;
mod repository;

pub use model::AssetDB;
pub use repository::AssetRepository;
