//! SQLite storage for subscriptions and invoices.

mod model;
mod repository;

pub use model::{InvoiceDB, SubscriptionDB};
pub use repository::BillingRepository;
