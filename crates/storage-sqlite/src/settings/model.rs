//! Database model for per-user settings.

use chrono::NaiveDateTime;
use diesel::prelude::*;

/// One JSON settings document per user.
#[derive(Queryable, Insertable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::user_settings)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserSettingsDB {
    pub user_id: String,
    pub settings: String,
    pub updated_at: NaiveDateTime,
}
