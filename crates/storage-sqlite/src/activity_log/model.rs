use chrono::NaiveDateTime;
use diesel::prelude::*;

use cybersentinel_core::activity::Activity;

#[derive(Queryable, Identifiable, Insertable, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::activity_log)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ActivityDB {
    pub id: String,
    pub user_id: String,
    pub company_id: Option<String>,
    pub activity_type: String,
    pub description: String,
    pub created_at: NaiveDateTime,
}

impl From<ActivityDB> for Activity {
    fn from(db: ActivityDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            company_id: db.company_id,
            activity_type: db.activity_type,
            description: db.description,
            timestamp: db.created_at,
        }
    }
}
