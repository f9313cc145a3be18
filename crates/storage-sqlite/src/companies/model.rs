use chrono::NaiveDateTime;
use diesel::prelude::*;

use cybersentinel_core::companies::{Company, NewCompany};

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::companies)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct CompanyDB {
    pub id: String,
    pub name: String,
    pub plan: String,
    pub assets_limit: i32,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<CompanyDB> for Company {
    fn from(db: CompanyDB) -> Self {
        Self {
            id: db.id,
            name: db.name,
            plan: db.plan,
            assets_limit: db.assets_limit,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl CompanyDB {
    pub fn from_new(company: NewCompany, now: NaiveDateTime) -> Self {
        Self {
            id: company.id,
            name: company.name,
            plan: company.plan,
            assets_limit: company.assets_limit,
            created_at: now,
            updated_at: now,
        }
    }
}
