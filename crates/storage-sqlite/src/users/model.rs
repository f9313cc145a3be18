//! Database models for users and profiles.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use std::str::FromStr;

use cybersentinel_core::users::{NewProfile, NewUser, Profile, Role, User};
use cybersentinel_core::Error;

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserDB {
    pub id: String,
    pub company_id: String,
    pub email: String,
    pub name: String,
    pub hashed_password: String,
    pub role: String,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Queryable, Identifiable, Insertable, AsChangeset, Selectable, PartialEq, Debug, Clone)]
#[diesel(table_name = crate::schema::profiles)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ProfileDB {
    pub id: String,
    pub user_id: String,
    pub full_name: String,
    pub email: String,
    pub role: String,
    pub country: Option<String>,
    pub phone: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl TryFrom<UserDB> for User {
    type Error = Error;

    fn try_from(db: UserDB) -> Result<Self, Self::Error> {
        Ok(Self {
            role: Role::from_str(&db.role)?,
            id: db.id,
            company_id: db.company_id,
            email: db.email,
            name: db.name,
            hashed_password: db.hashed_password,
            is_active: db.is_active,
            created_at: db.created_at,
            updated_at: db.updated_at,
        })
    }
}

impl UserDB {
    pub fn from_new(user: NewUser, now: NaiveDateTime) -> Self {
        Self {
            id: user.id,
            company_id: user.company_id,
            email: user.email,
            name: user.name,
            hashed_password: user.hashed_password,
            role: user.role.as_str().to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

impl From<ProfileDB> for Profile {
    fn from(db: ProfileDB) -> Self {
        Self {
            id: db.id,
            user_id: db.user_id,
            full_name: db.full_name,
            email: db.email,
            role: db.role,
            country: db.country,
            phone: db.phone,
            avatar_url: db.avatar_url,
            created_at: db.created_at,
            updated_at: db.updated_at,
        }
    }
}

impl ProfileDB {
    pub fn from_new(profile: NewProfile, now: NaiveDateTime) -> Self {
        Self {
            id: profile.id,
            user_id: profile.user_id,
            full_name: profile.full_name,
            email: profile.email,
            role: profile.role,
            country: profile.country,
            phone: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        }
    }
}
