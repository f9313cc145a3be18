use async_trait::async_trait;

use super::users_model::{
    NewProfile, NewUser, PasswordChange, Profile, ProfileUpdate, Role, SignupRequest, User,
    UserUpdate,
};
use crate::companies::NewCompany;
use crate::errors::Result;

/// Password hashing seam. The server provides an argon2 implementation.
pub trait CredentialHasher: Send + Sync {
    fn hash_password(&self, password: &str) -> Result<String>;
    fn verify_password(&self, password: &str, hashed: &str) -> Result<bool>;
}

#[async_trait]
pub trait UserRepositoryTrait: Send + Sync {
    fn get_by_id(&self, user_id: &str) -> Result<User>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    fn list_by_company(&self, company_id: &str, skip: i64, limit: i64) -> Result<Vec<User>>;
    fn get_profile(&self, user_id: &str) -> Result<Profile>;

    /// Inserts the company, the user and the profile in one transaction.
    async fn create_with_company(
        &self,
        company: NewCompany,
        user: NewUser,
        profile: NewProfile,
    ) -> Result<User>;
    async fn update(&self, user_id: &str, name: Option<String>, role: Option<Role>)
        -> Result<User>;
    async fn update_password(&self, user_id: &str, hashed_password: String) -> Result<()>;
    async fn delete(&self, user_id: &str) -> Result<usize>;
    async fn update_profile(&self, user_id: &str, update: ProfileUpdate) -> Result<Profile>;
    async fn update_avatar(&self, user_id: &str, avatar_url: String) -> Result<Profile>;
}

#[async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn signup(&self, request: SignupRequest) -> Result<User>;
    /// Checks credentials and records the login.
    async fn authenticate(&self, email: &str, password: &str) -> Result<User>;
    async fn logout(&self, user: &User);
    fn get_user(&self, user_id: &str) -> Result<User>;
    fn find_by_email(&self, email: &str) -> Result<Option<User>>;
    fn list_company_users(&self, actor: &User, skip: i64, limit: i64) -> Result<Vec<User>>;
    fn get_company_user(&self, actor: &User, user_id: &str) -> Result<User>;
    async fn update_user(&self, actor: &User, user_id: &str, update: UserUpdate) -> Result<User>;
    async fn delete_user(&self, actor: &User, user_id: &str) -> Result<()>;
    async fn change_password(&self, actor: &User, change: PasswordChange) -> Result<()>;
    async fn reset_password(&self, user_id: &str, new_password: &str) -> Result<()>;
    fn get_profile(&self, user_id: &str) -> Result<Profile>;
    async fn update_profile(&self, actor: &User, update: ProfileUpdate) -> Result<Profile>;
    async fn update_avatar(&self, user_id: &str, avatar_url: &str) -> Result<Profile>;
}
