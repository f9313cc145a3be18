use async_trait::async_trait;
use chrono::Utc;
use diesel::prelude::*;
use std::sync::Arc;

use super::model::{ProfileDB, UserDB};
use crate::companies::CompanyDB;
use crate::db::{get_connection, DbPool, WriteHandle};
use crate::errors::StorageError;
use crate::schema::{companies, profiles, users};
use cybersentinel_core::companies::NewCompany;
use cybersentinel_core::users::{
    NewProfile, NewUser, Profile, ProfileUpdate, Role, User, UserRepositoryTrait,
};
use cybersentinel_core::Result;

pub struct UserRepository {
    pool: Arc<DbPool>,
    writer: WriteHandle,
}

impl UserRepository {
    pub fn new(pool: Arc<DbPool>, writer: WriteHandle) -> Self {
        Self { pool, writer }
    }
}

fn load_profile(conn: &mut SqliteConnection, user_id: &str) -> Result<ProfileDB> {
    Ok(profiles::table
        .filter(profiles::user_id.eq(user_id))
        .select(ProfileDB::as_select())
        .first(conn)
        .map_err(StorageError::from)?)
}

#[async_trait]
impl UserRepositoryTrait for UserRepository {
    fn get_by_id(&self, user_id: &str) -> Result<User> {
        let mut conn = get_connection(&self.pool)?;
        let row = users::table
            .find(user_id)
            .select(UserDB::as_select())
            .first(&mut conn)
            .map_err(StorageError::from)?;
        User::try_from(row)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        let mut conn = get_connection(&self.pool)?;
        let row = users::table
            .filter(users::email.eq(email.trim().to_lowercase()))
            .select(UserDB::as_select())
            .first(&mut conn)
            .optional()
            .map_err(StorageError::from)?;
        row.map(User::try_from).transpose()
    }

    fn list_by_company(&self, company_id: &str, skip: i64, limit: i64) -> Result<Vec<User>> {
        let mut conn = get_connection(&self.pool)?;
        users::table
            .filter(users::company_id.eq(company_id))
            .order(users::created_at.asc())
            .offset(skip)
            .limit(limit)
            .select(UserDB::as_select())
            .load::<UserDB>(&mut conn)
            .map_err(StorageError::from)?
            .into_iter()
            .map(User::try_from)
            .collect()
    }

    fn get_profile(&self, user_id: &str) -> Result<Profile> {
        let mut conn = get_connection(&self.pool)?;
        Ok(load_profile(&mut conn, user_id)?.into())
    }

    async fn create_with_company(
        &self,
        company: NewCompany,
        user: NewUser,
        profile: NewProfile,
    ) -> Result<User> {
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let now = Utc::now().naive_utc();
                diesel::insert_into(companies::table)
                    .values(CompanyDB::from_new(company, now))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                let inserted = diesel::insert_into(users::table)
                    .values(UserDB::from_new(user, now))
                    .returning(UserDB::as_returning())
                    .get_result(conn)
                    .map_err(StorageError::from)?;
                diesel::insert_into(profiles::table)
                    .values(ProfileDB::from_new(profile, now))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                User::try_from(inserted)
            })
            .await
    }

    async fn update(
        &self,
        user_id: &str,
        name: Option<String>,
        role: Option<Role>,
    ) -> Result<User> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<User> {
                let mut row = users::table
                    .find(&user_id)
                    .select(UserDB::as_select())
                    .first(conn)
                    .map_err(StorageError::from)?;
                if let Some(name) = name {
                    row.name = name;
                }
                if let Some(role) = role {
                    row.role = role.as_str().to_string();
                    diesel::update(profiles::table.filter(profiles::user_id.eq(&user_id)))
                        .set(profiles::role.eq(role.as_str()))
                        .execute(conn)
                        .map_err(StorageError::from)?;
                }
                row.updated_at = Utc::now().naive_utc();
                diesel::update(users::table.find(&user_id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                User::try_from(row)
            })
            .await
    }

    async fn update_password(&self, user_id: &str, hashed_password: String) -> Result<()> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<()> {
                let affected = diesel::update(users::table.find(&user_id))
                    .set((
                        users::hashed_password.eq(hashed_password),
                        users::updated_at.eq(Utc::now().naive_utc()),
                    ))
                    .execute(conn)
                    .map_err(StorageError::from)?;
                if affected == 0 {
                    return Err(StorageError::QueryFailed(diesel::result::Error::NotFound).into());
                }
                Ok(())
            })
            .await
    }

    async fn delete(&self, user_id: &str) -> Result<usize> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<usize> {
                Ok(diesel::delete(users::table.find(user_id))
                    .execute(conn)
                    .map_err(StorageError::from)?)
            })
            .await
    }

    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Profile> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Profile> {
                let mut row = load_profile(conn, &user_id)?;
                if let Some(full_name) = update.full_name {
                    row.full_name = full_name;
                }
                if let Some(phone) = update.phone {
                    row.phone = Some(phone);
                }
                if let Some(country) = update.country {
                    row.country = Some(country);
                }
                row.updated_at = Utc::now().naive_utc();
                diesel::update(profiles::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }

    async fn update_avatar(&self, user_id: &str, avatar_url: String) -> Result<Profile> {
        let user_id = user_id.to_string();
        self.writer
            .exec(move |conn: &mut SqliteConnection| -> Result<Profile> {
                let mut row = load_profile(conn, &user_id)?;
                row.avatar_url = Some(avatar_url);
                row.updated_at = Utc::now().naive_utc();
                diesel::update(profiles::table.find(&row.id))
                    .set(&row)
                    .execute(conn)
                    .map_err(StorageError::from)?;
                Ok(row.into())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_db;

    fn signup_rows(company_id: &str, user_id: &str, email: &str) -> (NewCompany, NewUser, NewProfile) {
        (
            NewCompany {
                id: company_id.to_string(),
                name: "Acme".to_string(),
                plan: "starter".to_string(),
                assets_limit: 10,
            },
            NewUser {
                id: user_id.to_string(),
                company_id: company_id.to_string(),
                email: email.to_string(),
                name: "Alice".to_string(),
                hashed_password: "hash".to_string(),
                role: Role::Admin,
            },
            NewProfile {
                id: format!("p-{user_id}"),
                user_id: user_id.to_string(),
                full_name: "Alice Doe".to_string(),
                email: email.to_string(),
                role: "admin".to_string(),
                country: Some("US".to_string()),
            },
        )
    }

    #[tokio::test]
    async fn signup_creates_company_user_and_profile() {
        let (pool, writer, _dir) = setup_db();
        let repo = UserRepository::new(Arc::clone(&pool), writer);

        let (company, user, profile) = signup_rows("c1", "u1", "alice@acme.io");
        let created = repo.create_with_company(company, user, profile).await.unwrap();
        assert_eq!(created.role, Role::Admin);
        assert!(created.is_active);

        let found = repo.find_by_email("Alice@Acme.io").unwrap().unwrap();
        assert_eq!(found.id, "u1");
        assert_eq!(repo.get_profile("u1").unwrap().country.as_deref(), Some("US"));
        assert_eq!(repo.list_by_company("c1", 0, 10).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn duplicate_email_rolls_back_the_company() {
        let (pool, writer, _dir) = setup_db();
        let repo = UserRepository::new(Arc::clone(&pool), writer);

        let (c, u, p) = signup_rows("c1", "u1", "alice@acme.io");
        repo.create_with_company(c, u, p).await.unwrap();
        let (c, u, p) = signup_rows("c2", "u2", "alice@acme.io");
        assert!(repo.create_with_company(c, u, p).await.is_err());

        let mut conn = get_connection(&pool).unwrap();
        let count: i64 = companies::table.count().get_result(&mut conn).unwrap();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn role_change_is_mirrored_on_the_profile() {
        let (pool, writer, _dir) = setup_db();
        let repo = UserRepository::new(Arc::clone(&pool), writer);
        let (c, u, p) = signup_rows("c1", "u1", "alice@acme.io");
        repo.create_with_company(c, u, p).await.unwrap();

        let updated = repo
            .update("u1", Some("Al".to_string()), Some(Role::Reader))
            .await
            .unwrap();
        assert_eq!(updated.name, "Al");
        assert_eq!(updated.role, Role::Reader);
        assert_eq!(repo.get_profile("u1").unwrap().role, "reader");
    }

    #[tokio::test]
    async fn profile_and_password_updates() {
        let (pool, writer, _dir) = setup_db();
        let repo = UserRepository::new(Arc::clone(&pool), writer);
        let (c, u, p) = signup_rows("c1", "u1", "alice@acme.io");
        repo.create_with_company(c, u, p).await.unwrap();

        let profile = repo
            .update_profile(
                "u1",
                ProfileUpdate {
                    phone: Some("+1 555".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(profile.phone.as_deref(), Some("+1 555"));
        assert_eq!(profile.full_name, "Alice Doe");

        let avatar = repo
            .update_avatar("u1", "/uploads/avatars/u1.png".to_string())
            .await
            .unwrap();
        assert_eq!(avatar.avatar_url.as_deref(), Some("/uploads/avatars/u1.png"));

        repo.update_password("u1", "new-hash".to_string()).await.unwrap();
        assert_eq!(repo.get_by_id("u1").unwrap().hashed_password, "new-hash");
        assert!(repo
            .update_password("missing", "x".to_string())
            .await
            .unwrap_err()
            .is_not_found());
    }

    #[tokio::test]
    async fn delete_removes_the_profile_too() {
        let (pool, writer, _dir) = setup_db();
        let repo = UserRepository::new(Arc::clone(&pool), writer);
        let (c, u, p) = signup_rows("c1", "u1", "alice@acme.io");
        repo.create_with_company(c, u, p).await.unwrap();

        assert_eq!(repo.delete("u1").await.unwrap(), 1);
        assert!(repo.get_by_id("u1").unwrap_err().is_not_found());
        assert!(repo.get_profile("u1").unwrap_err().is_not_found());
    }
}
