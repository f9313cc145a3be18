//! CyberSentinel Core - Domain entities, services, and traits.
//!
//! This crate contains the business rules of the security platform: tenants,
//! users, assets, attack surface discoveries, vulnerability scans and the
//! queue contract shared by the API and the workers. It is database-agnostic
//! and defines traits that are implemented by the `storage-sqlite` crate.

pub mod activity;
pub mod asm;
pub mod assets;
pub mod billing;
pub mod catalog;
pub mod companies;
pub mod constants;
pub mod errors;
pub mod queue;
pub mod scans;
pub mod settings;
pub mod tasks;
pub mod users;
pub mod utils;

// Re-export error types
pub use errors::Error;
pub use errors::Result;
