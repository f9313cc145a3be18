//! Message queue contract shared by the API service and the workers.
//!
//! The API publishes discovery triggers and scan jobs; the workers claim them
//! one at a time, process them and then acknowledge or reject them. A message
//! that is claimed but never acknowledged becomes eligible for redelivery, so
//! consumers must tolerate seeing the same payload twice.
//!
//! ```ignore
//! let id = publish_json(queue.as_ref(), ASM_TRIGGERS_QUEUE, &trigger).await?;
//! if let Some(delivery) = queue.receive(ASM_TRIGGERS_QUEUE).await? {
//!     match handle(&delivery).await {
//!         Ok(()) => queue.ack(&delivery).await?,
//!         Err(_) => queue.nack(&delivery, true).await?,
//!     }
//! }
//! ```

mod memory;
mod queue_error;
mod queue_model;
mod queue_traits;

pub use memory::InMemoryMessageQueue;
pub use queue_error::QueueError;
pub use queue_model::{Delivery, MessageId, QueueHealth};
pub use queue_traits::{publish_json, MessageQueue};
