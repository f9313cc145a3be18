use chrono::NaiveDateTime;
use diesel::prelude::*;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::queue_messages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QueueMessageDB {
    pub id: String,
    pub queue: String,
    pub payload: String,
    pub status: String,
    pub attempts: i32,
    pub available_at: NaiveDateTime,
    pub locked_at: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
}

pub(crate) const STATUS_PENDING: &str = "pending";
pub(crate) const STATUS_INFLIGHT: &str = "inflight";
/// Acked rows keep `locked_at` as the time they were settled.
pub(crate) const STATUS_ACKED: &str = "acked";
pub(crate) const STATUS_DEAD: &str = "dead";
