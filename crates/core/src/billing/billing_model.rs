use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::utils::validation::require_non_empty;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Trial,
    Active,
    Cancelled,
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
        }
    }
}

impl FromStr for SubscriptionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "trial" => Ok(SubscriptionStatus::Trial),
            "active" => Ok(SubscriptionStatus::Active),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            _ => Err(Error::invalid(format!("Invalid subscription status: {}", s))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Subscription {
    pub id: String,
    pub user_id: String,
    pub plan: String,
    pub billing_period: String,
    pub status: SubscriptionStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

/// What `GET /billing/plan` reports.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanInfo {
    pub plan: String,
    pub billing_period: String,
    pub status: SubscriptionStatus,
}

impl From<Subscription> for PlanInfo {
    fn from(s: Subscription) -> Self {
        Self {
            plan: s.plan,
            billing_period: s.billing_period,
            status: s.status,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionRequest {
    pub plan: String,
    pub billing_period: String,
}

impl SubscriptionRequest {
    pub fn validate(&self) -> Result<()> {
        require_non_empty(&self.plan, "Plan")?;
        require_non_empty(&self.billing_period, "Billing period")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpgradeRequest {
    pub plan: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Invoice {
    pub id: String,
    #[serde(skip_serializing, default)]
    pub user_id: String,
    pub amount: f64,
    pub status: String,
    pub created_at: NaiveDateTime,
}
