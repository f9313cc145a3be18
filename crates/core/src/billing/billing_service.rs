use async_trait::async_trait;
use chrono::Utc;
use log::info;
use std::sync::Arc;
use uuid::Uuid;

use super::billing_model::{
    Invoice, PlanInfo, Subscription, SubscriptionRequest, SubscriptionStatus,
};
use super::billing_traits::{BillingRepositoryTrait, BillingServiceTrait};
use crate::constants::DEFAULT_PLAN;
use crate::errors::{Error, Result};
use crate::users::User;

pub struct BillingService {
    repository: Arc<dyn BillingRepositoryTrait>,
}

impl BillingService {
    pub fn new(repository: Arc<dyn BillingRepositoryTrait>) -> Self {
        Self { repository }
    }

    fn existing(&self, user: &User) -> Result<Subscription> {
        self.repository
            .get_subscription(&user.id)?
            .ok_or_else(|| Error::not_found("Subscription not found"))
    }
}

#[async_trait]
impl BillingServiceTrait for BillingService {
    fn current_plan(&self, user: &User) -> Result<PlanInfo> {
        Ok(match self.repository.get_subscription(&user.id)? {
            Some(subscription) => subscription.into(),
            None => PlanInfo {
                plan: DEFAULT_PLAN.to_string(),
                billing_period: "monthly".to_string(),
                status: SubscriptionStatus::Trial,
            },
        })
    }

    async fn subscribe(&self, user: &User, request: SubscriptionRequest) -> Result<Subscription> {
        request.validate()?;
        let now = Utc::now().naive_utc();
        let subscription = match self.repository.get_subscription(&user.id)? {
            Some(existing) => Subscription {
                plan: request.plan,
                billing_period: request.billing_period,
                status: SubscriptionStatus::Active,
                updated_at: now,
                ..existing
            },
            None => Subscription {
                id: Uuid::new_v4().to_string(),
                user_id: user.id.clone(),
                plan: request.plan,
                billing_period: request.billing_period,
                status: SubscriptionStatus::Active,
                created_at: now,
                updated_at: now,
            },
        };
        info!("User {} subscribed to {}", user.id, subscription.plan);
        self.repository.upsert_subscription(subscription).await
    }

    async fn upgrade(&self, user: &User, plan: Option<String>) -> Result<Subscription> {
        let plan = plan
            .map(|p| p.trim().to_string())
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::invalid("Plan is required"))?;
        let mut subscription = self.existing(user)?;
        subscription.plan = plan;
        subscription.updated_at = Utc::now().naive_utc();
        self.repository.upsert_subscription(subscription).await
    }

    async fn cancel(&self, user: &User) -> Result<Subscription> {
        let mut subscription = self.existing(user)?;
        subscription.status = SubscriptionStatus::Cancelled;
        subscription.updated_at = Utc::now().naive_utc();
        self.repository.upsert_subscription(subscription).await
    }

    fn list_invoices(&self, user: &User) -> Result<Vec<Invoice>> {
        self.repository.list_invoices(&user.id)
    }

    fn get_invoice(&self, user: &User, invoice_id: &str) -> Result<Invoice> {
        self.repository
            .get_invoice(&user.id, invoice_id)
            .map_err(|e| {
                if e.is_not_found() {
                    Error::not_found("Invoice not found")
                } else {
                    e
                }
            })
    }
}
