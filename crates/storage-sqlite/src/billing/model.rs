use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::str::FromStr;

use cybersentinel_core::billing::{Invoice, Subscription, SubscriptionStatus};
use cybersentinel_core::errors::{Error, Result};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::subscriptions)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct SubscriptionDB {
    pub id: String,
    pub user_id: String,
    pub plan: String,
    pub billing_period: String,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<SubscriptionDB> for Subscription {
    type Error = Error;

    fn try_from(db: SubscriptionDB) -> Result<Self> {
        Ok(Self {
            status: SubscriptionStatus::from_str(&db.status)?,
            id: db.id,
            user_id: db.user_id,
            plan: db.plan,
            billing_period: db.billing_period,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl From<&Subscription> for SubscriptionDB {
    fn from(s: &Subscription) -> Self {
        Self {
            id: s.id.clone(),
            user_id: s.user_id.clone(),
            plan: s.plan.clone(),
            billing_period: s.billing_period.clone(),
            status: s.status.as_str().to_string(),
            created_at: s.created_at,
            updated_at: s.updated_at,
        }
    }
}

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::invoices)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct InvoiceDB {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub status: String,
    pub created_at: NaiveDateTime,
}

impl From<InvoiceDB> for Invoice {
    fn from(db: InvoiceDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            amount: db.amount,
            status: db.status,
            created_at: db.created_at,
        }
    }
}
