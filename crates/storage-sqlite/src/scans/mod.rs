//! SQLite storage for vulnerability scans and their findings.

mod model;
mod repository;

pub use model::{FindingDB, ScanDB};
pub use repository::ScanRepository;
