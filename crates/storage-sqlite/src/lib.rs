//! SQLite storage implementation for CyberSentinel.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the repository traits defined in `cybersentinel-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for all domain entities
//! - The durable message queue and the pipeline document store
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The server and the worker depend on `core` traits and receive these
//! implementations at startup.
//!
//! ```text
//!   apps/server        apps/worker
//!        │                  │
//!        └───────┬──────────┘
//!                ▼
//!        core (domain, traits)
//!                ▲
//!                │
//!        storage-sqlite (this crate)
//!                │
//!                ▼
//!            SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;
pub mod utils;

// Repository implementations
pub mod activity_log;
pub mod asm;
pub mod assets;
pub mod billing;
pub mod companies;
pub mod queue;
pub mod scans;
pub mod settings;
pub mod tasks;
pub mod users;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, init, run_migrations, spawn_writer, DbConnection, DbPool,
    WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

pub use activity_log::ActivityRepository;
pub use asm::{AsmRepository, SqlitePipelineStore};
pub use assets::AssetRepository;
pub use billing::BillingRepository;
pub use companies::CompanyRepository;
pub use queue::{QueueOptions, SqliteMessageQueue};
pub use scans::ScanRepository;
pub use settings::SettingsRepository;
pub use tasks::TaskRepository;
pub use users::UserRepository;

// Re-export from cybersentinel-core for convenience
pub use cybersentinel_core::errors::{DatabaseError, Error, Result};
