//! Durable [`MessageQueue`](cybersentinel_core::queue::MessageQueue) backed
//! by the `queue_messages` table.

mod model;
mod sqlite_queue;

pub use model::QueueMessageDB;
pub use sqlite_queue::{QueueOptions, SqliteMessageQueue};
