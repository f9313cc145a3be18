pub mod config;
pub mod consumers;
pub mod control_plane;
pub mod dispatcher;
pub mod executor;
pub mod job_manager;
mod main_lib;
pub mod tools;

pub use main_lib::{build_context, init_tracing, WorkerContext};
