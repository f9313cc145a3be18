use async_trait::async_trait;

use super::billing_model::{Invoice, PlanInfo, Subscription, SubscriptionRequest};
use crate::errors::Result;
use crate::users::User;

#[async_trait]
pub trait BillingRepositoryTrait: Send + Sync {
    fn get_subscription(&self, user_id: &str) -> Result<Option<Subscription>>;
    fn list_invoices(&self, user_id: &str) -> Result<Vec<Invoice>>;
    fn get_invoice(&self, user_id: &str, invoice_id: &str) -> Result<Invoice>;

    /// Inserts or replaces the user's single subscription.
    async fn upsert_subscription(&self, subscription: Subscription) -> Result<Subscription>;
}

#[async_trait]
pub trait BillingServiceTrait: Send + Sync {
    fn current_plan(&self, user: &User) -> Result<PlanInfo>;
    async fn subscribe(&self, user: &User, request: SubscriptionRequest) -> Result<Subscription>;
    async fn upgrade(&self, user: &User, plan: Option<String>) -> Result<Subscription>;
    async fn cancel(&self, user: &User) -> Result<Subscription>;
    fn list_invoices(&self, user: &User) -> Result<Vec<Invoice>>;
    fn get_invoice(&self, user: &User, invoice_id: &str) -> Result<Invoice>;
}
