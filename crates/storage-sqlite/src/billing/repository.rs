use async_trait::async_trait;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::{InvoiceDB, SubscriptionDB};
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{invoices, subscriptions};
use cybersentinel_core::billing::{BillingRepositoryTrait, Invoice, Subscription};
use cybersentinel_core::Result;

pub struct BillingRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl BillingRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

#[async_trait]
impl BillingRepositoryTrait for BillingRepository {
    fn get_subscription(&self, user_id: &str) -> Result<Option<Subscription>> {
        let mut conn = get_connection(&self.pool)?;
        subscriptions::table
            .filter(subscriptions::user_id.eq(user_id))
            .select(SubscriptionDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?
            .map(Subscription::try_from)
            .transpose()
    }

    fn list_invoices(&self, user_id: &str) -> Result<Vec<Invoice>> {
        let mut conn = get_connection(&self.pool)?;
        let rows = invoices::table
            .filter(invoices::user_id.eq(user_id))
            .order(invoices::created_at.desc())
            .select(InvoiceDB::as_select())
            .load::<InvoiceDB>(&mut conn)
            .map_err(StorageError::from)?;
        Ok(rows.into_iter().map(Invoice::from).collect())
    }

    fn get_invoice(&self, user_id: &str, invoice_id: &str) -> Result<Invoice> {
        let mut conn = get_connection(&self.pool)?;
        let row = invoices::table
            .filter(invoices::id.eq(invoice_id))
            .filter(invoices::user_id.eq(user_id))
            .select(InvoiceDB::as_select())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        Ok(row.into())
    }

    async fn upsert_subscription(&self, subscription: Subscription) -> Result<Subscription> {
        let row = SubscriptionDB::from(&subscription);
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Subscription> {
                let stored = diesel::insert_into(subscriptions::table)
                    .values(&row)
                    .on_conflict(subscriptions::user_id)
                    .do_update()
                    .set((
                        subscriptions::plan.eq(&row.plan),
                        subscriptions::billing_period.eq(&row.billing_period),
                        subscriptions::status.eq(&row.status),
                        subscriptions::updated_at.eq(row.updated_at),
                    ))
                    .returning(SubscriptionDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                Subscription::try_from(stored)
            })
            .await
    }
}
