//! In-memory fakes shared by the service tests of several modules.

use async_trait::async_trait;
use std::sync::Mutex;

use super::{NewProfile, NewUser, Profile, ProfileUpdate, Role, User};
use super::{CredentialHasher, UserRepositoryTrait};
use crate::activity::{ActivityList, ActivityServiceTrait, NewActivity};
use crate::companies::{Company, CompanyRepositoryTrait, CompanyUpdate, NewCompany};
use crate::errors::{Error, Result};

pub fn member(id: &str, company_id: &str, role: Role) -> User {
    let now = chrono::Utc::now().naive_utc();
    User {
        id: id.to_string(),
        company_id: company_id.to_string(),
        email: format!("{}@example.com", id),
        name: id.to_string(),
        hashed_password: "hashed:password123".to_string(),
        role,
        is_active: true,
        created_at: now,
        updated_at: now,
    }
}

pub fn company(id: &str, assets_limit: i32) -> Company {
    let now = chrono::Utc::now().naive_utc();
    Company {
        id: id.to_string(),
        name: format!("{} Inc", id),
        plan: "starter".to_string(),
        assets_limit,
        created_at: now,
        updated_at: now,
    }
}

pub struct PlainHasher;

impl CredentialHasher for PlainHasher {
    fn hash_password(&self, password: &str) -> Result<String> {
        Ok(format!("hashed:{}", password))
    }

    fn verify_password(&self, password: &str, hashed: &str) -> Result<bool> {
        Ok(hashed == format!("hashed:{}", password))
    }
}

pub struct NoopActivityService;

#[async_trait]
impl ActivityServiceTrait for NoopActivityService {
    async fn record(&self, _activity: NewActivity) {}

    fn user_activity(&self, _user: &User, _skip: i64, _limit: i64) -> Result<ActivityList> {
        Ok(ActivityList {
            items: vec![],
            total: 0,
        })
    }

    fn audit_logs(&self, _actor: &User, _skip: i64, _limit: i64) -> Result<ActivityList> {
        unimplemented!()
    }
}

/// Backs both the user and the company repository traits.
#[derive(Default)]
pub struct MockUserRepository {
    pub users: Mutex<Vec<User>>,
    pub profiles: Mutex<Vec<Profile>>,
    pub companies: Mutex<Vec<Company>>,
}

impl MockUserRepository {
    pub fn insert(&self, user: User) {
        self.users.lock().unwrap().push(user);
    }

    pub fn insert_company(&self, company: Company) {
        self.companies.lock().unwrap().push(company);
    }

    pub fn set_active(&self, user_id: &str, active: bool) {
        for u in self.users.lock().unwrap().iter_mut() {
            if u.id == user_id {
                u.is_active = active;
            }
        }
    }
}

#[async_trait]
impl UserRepositoryTrait for MockUserRepository {
    fn get_by_id(&self, user_id: &str) -> Result<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
            .ok_or_else(|| Error::not_found("User not found"))
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    fn list_by_company(&self, company_id: &str, skip: i64, limit: i64) -> Result<Vec<User>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .filter(|u| u.company_id == company_id)
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    fn get_profile(&self, user_id: &str) -> Result<Profile> {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Profile not found"))
    }

    async fn create_with_company(
        &self,
        new_company: NewCompany,
        user: NewUser,
        profile: NewProfile,
    ) -> Result<User> {
        let now = chrono::Utc::now().naive_utc();
        self.companies.lock().unwrap().push(Company {
            id: new_company.id,
            name: new_company.name,
            plan: new_company.plan,
            assets_limit: new_company.assets_limit,
            created_at: now,
            updated_at: now,
        });
        let created = User {
            id: user.id,
            company_id: user.company_id,
            email: user.email,
            name: user.name,
            hashed_password: user.hashed_password,
            role: user.role,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        self.users.lock().unwrap().push(created.clone());
        self.profiles.lock().unwrap().push(Profile {
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
        });
        Ok(created)
    }

    async fn update(
        &self,
        user_id: &str,
        name: Option<String>,
        role: Option<Role>,
    ) -> Result<User> {
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == user_id)
            .ok_or_else(|| Error::not_found("User not found"))?;
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(role) = role {
            user.role = role;
        }
        Ok(user.clone())
    }

    async fn update_password(&self, user_id: &str, hashed_password: String) -> Result<()> {
        let mut users = self.users.lock().unwrap();
        if let Some(user) = users.iter_mut().find(|u| u.id == user_id) {
            user.hashed_password = hashed_password;
        }
        Ok(())
    }

    async fn delete(&self, user_id: &str) -> Result<usize> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.id != user_id);
        Ok(before - users.len())
    }

    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Profile> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| Error::not_found("Profile not found"))?;
        if let Some(v) = update.full_name {
            profile.full_name = v;
        }
        if update.phone.is_some() {
            profile.phone = update.phone;
        }
        if update.country.is_some() {
            profile.country = update.country;
        }
        Ok(profile.clone())
    }

    async fn update_avatar(&self, user_id: &str, avatar_url: String) -> Result<Profile> {
        let mut profiles = self.profiles.lock().unwrap();
        let profile = profiles
            .iter_mut()
            .find(|p| p.user_id == user_id)
            .ok_or_else(|| Error::not_found("Profile not found"))?;
        profile.avatar_url = Some(avatar_url);
        Ok(profile.clone())
    }
}

#[async_trait]
impl CompanyRepositoryTrait for MockUserRepository {
    fn get_by_id(&self, company_id: &str) -> Result<Company> {
        self.companies
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == company_id)
            .cloned()
            .ok_or_else(|| Error::not_found("Account not found"))
    }

    async fn update(&self, company_id: &str, update: CompanyUpdate) -> Result<Company> {
        let mut companies = self.companies.lock().unwrap();
        let company = companies
            .iter_mut()
            .find(|c| c.id == company_id)
            .ok_or_else(|| Error::not_found("Account not found"))?;
        if let Some(name) = update.name {
            company.name = name;
        }
        if let Some(plan) = update.plan {
            company.plan = plan;
        }
        Ok(company.clone())
    }
}
