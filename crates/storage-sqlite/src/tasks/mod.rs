//! SQLite storage for remediation tasks and their message threads.

mod model;
mod repository;

pub use model::{TaskDB, TaskMessageDB};
pub use repository::TaskRepository;
