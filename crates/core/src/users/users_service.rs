use async_trait::async_trait;
use log::{debug, info};
use std::str::FromStr;
use std::sync::Arc;
use uuid::Uuid;

use super::users_model::{
    NewProfile, NewUser, PasswordChange, Profile, ProfileUpdate, Role, SignupRequest, User,
    UserUpdate,
};
use super::users_traits::{CredentialHasher, UserRepositoryTrait, UserServiceTrait};
use crate::activity::{ActivityKind, ActivityServiceTrait, NewActivity};
use crate::companies::NewCompany;
use crate::constants::{DEFAULT_ASSETS_LIMIT, DEFAULT_PLAN};
use crate::errors::{Error, Result};
use crate::utils::validation::{require_non_empty, validate_password};

const INVALID_CREDENTIALS: &str = "Incorrect email or password";

pub struct UserService {
    repository: Arc<dyn UserRepositoryTrait>,
    hasher: Arc<dyn CredentialHasher>,
    activity: Arc<dyn ActivityServiceTrait>,
}

impl UserService {
    pub fn new(
        repository: Arc<dyn UserRepositoryTrait>,
        hasher: Arc<dyn CredentialHasher>,
        activity: Arc<dyn ActivityServiceTrait>,
    ) -> Self {
        Self {
            repository,
            hasher,
            activity,
        }
    }

    async fn record(&self, user: &User, kind: ActivityKind, description: impl Into<String>) {
        self.activity
            .record(NewActivity::new(
                user.id.clone(),
                Some(user.company_id.clone()),
                kind,
                description,
            ))
            .await;
    }
}

#[async_trait]
impl UserServiceTrait for UserService {
    async fn signup(&self, request: SignupRequest) -> Result<User> {
        let role = request.validate()?;
        let email = request.email.trim().to_lowercase();

        if self.repository.find_by_email(&email)?.is_some() {
            return Err(Error::invalid("Email already registered"));
        }

        let hashed_password = self.hasher.hash_password(&request.password)?;
        let company_id = Uuid::new_v4().to_string();
        let user_id = Uuid::new_v4().to_string();

        let company = NewCompany {
            id: company_id.clone(),
            name: request.company_name.trim().to_string(),
            plan: DEFAULT_PLAN.to_string(),
            assets_limit: DEFAULT_ASSETS_LIMIT,
        };
        let user = NewUser {
            id: user_id.clone(),
            company_id,
            email: email.clone(),
            name: request.full_name.trim().to_string(),
            hashed_password,
            role,
        };
        let profile = NewProfile {
            id: Uuid::new_v4().to_string(),
            user_id,
            full_name: request.full_name.trim().to_string(),
            email,
            role: role.as_str().to_string(),
            country: Some(request.country).filter(|c| !c.trim().is_empty()),
        };

        let created = self
            .repository
            .create_with_company(company, user, profile)
            .await?;
        info!("Created user {} in company {}", created.id, created.company_id);
        self.record(&created, ActivityKind::Signup, "Account created")
            .await;
        Ok(created)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<User> {
        let email = email.trim().to_lowercase();
        let user = self
            .repository
            .find_by_email(&email)?
            .ok_or_else(|| Error::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !self
            .hasher
            .verify_password(password, &user.hashed_password)?
        {
            debug!("Rejected login for {}", user.id);
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }
        if !user.is_active {
            return Err(Error::forbidden("User account is inactive"));
        }

        self.record(&user, ActivityKind::Login, "User logged in")
            .await;
        Ok(user)
    }

    async fn logout(&self, user: &User) {
        self.record(user, ActivityKind::Logout, "User logged out")
            .await;
    }

    fn get_user(&self, user_id: &str) -> Result<User> {
        self.repository.get_by_id(user_id)
    }

    fn find_by_email(&self, email: &str) -> Result<Option<User>> {
        self.repository.find_by_email(&email.trim().to_lowercase())
    }

    fn list_company_users(&self, actor: &User, skip: i64, limit: i64) -> Result<Vec<User>> {
        self.repository
            .list_by_company(&actor.company_id, skip, limit)
    }

    fn get_company_user(&self, actor: &User, user_id: &str) -> Result<User> {
        match self.repository.get_by_id(user_id) {
            Ok(user) if user.company_id == actor.company_id => Ok(user),
            Ok(_) => Err(Error::not_found("User not found")),
            Err(e) if e.is_not_found() => Err(Error::not_found("User not found")),
            Err(e) => Err(e),
        }
    }

    async fn update_user(&self, actor: &User, user_id: &str, update: UserUpdate) -> Result<User> {
        let target = self.get_company_user(actor, user_id)?;
        if actor.id != target.id && !actor.is_admin() {
            return Err(Error::forbidden("Not authorized to update this user"));
        }

        if let Some(name) = &update.name {
            require_non_empty(name, "Name")?;
        }
        let role = match update.role.as_deref() {
            Some(raw) => {
                let role = Role::from_str(raw)?;
                if role != target.role && !actor.is_admin() {
                    return Err(Error::forbidden("Only admins can change roles"));
                }
                Some(role)
            }
            None => None,
        };

        self.repository
            .update(&target.id, update.name.map(|n| n.trim().to_string()), role)
            .await
    }

    async fn delete_user(&self, actor: &User, user_id: &str) -> Result<()> {
        if !actor.is_admin() {
            return Err(Error::forbidden("Only admins can delete users"));
        }
        let target = self.get_company_user(actor, user_id)?;
        if target.id == actor.id {
            return Err(Error::invalid("Cannot delete your own account"));
        }

        self.repository.delete(&target.id).await?;
        self.record(
            actor,
            ActivityKind::UserDeleted,
            format!("Deleted user {}", target.email),
        )
        .await;
        Ok(())
    }

    async fn change_password(&self, actor: &User, change: PasswordChange) -> Result<()> {
        let user = self.repository.get_by_id(&actor.id)?;
        if !self
            .hasher
            .verify_password(&change.current_password, &user.hashed_password)?
        {
            return Err(Error::invalid("Current password is incorrect"));
        }
        validate_password(&change.new_password)?;

        let hashed = self.hasher.hash_password(&change.new_password)?;
        self.repository.update_password(&user.id, hashed).await?;
        self.record(&user, ActivityKind::PasswordChange, "Password changed")
            .await;
        Ok(())
    }

    async fn reset_password(&self, user_id: &str, new_password: &str) -> Result<()> {
        validate_password(new_password)?;
        let user = self.repository.get_by_id(user_id)?;
        let hashed = self.hasher.hash_password(new_password)?;
        self.repository.update_password(&user.id, hashed).await?;
        self.record(&user, ActivityKind::PasswordReset, "Password reset")
            .await;
        Ok(())
    }

    fn get_profile(&self, user_id: &str) -> Result<Profile> {
        self.repository.get_profile(user_id).map_err(|e| {
            if e.is_not_found() {
                Error::not_found("Profile not found")
            } else {
                e
            }
        })
    }

    async fn update_profile(&self, actor: &User, update: ProfileUpdate) -> Result<Profile> {
        if let Some(full_name) = &update.full_name {
            require_non_empty(full_name, "Full name")?;
        }
        self.get_profile(&actor.id)?;
        let profile = self.repository.update_profile(&actor.id, update).await?;
        self.record(actor, ActivityKind::ProfileUpdate, "Profile updated")
            .await;
        Ok(profile)
    }

    async fn update_avatar(&self, user_id: &str, avatar_url: &str) -> Result<Profile> {
        self.get_profile(user_id)?;
        self.repository
            .update_avatar(user_id, avatar_url.to_string())
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::users::test_support::{
        member, MockUserRepository, NoopActivityService, PlainHasher,
    };

    fn service(repo: Arc<MockUserRepository>) -> UserService {
        UserService::new(repo, Arc::new(PlainHasher), Arc::new(NoopActivityService))
    }

    fn signup(email: &str) -> SignupRequest {
        SignupRequest {
            company_name: "Acme".into(),
            full_name: "Alice Doe".into(),
            email: email.into(),
            password: "password123".into(),
            role: "admin".into(),
            country: "US".into(),
        }
    }

    #[tokio::test]
    async fn signup_creates_company_user_and_profile() {
        let repo = Arc::new(MockUserRepository::default());
        let svc = service(repo.clone());

        let user = svc.signup(signup("Alice@Acme.io")).await.unwrap();
        assert_eq!(user.email, "alice@acme.io");
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.hashed_password, "hashed:password123");

        let companies = repo.companies.lock().unwrap();
        assert_eq!(companies[0].plan, "starter");
        assert_eq!(companies[0].assets_limit, 500);
        let profile = svc.get_profile(&user.id).unwrap();
        assert_eq!(profile.full_name, "Alice Doe");
        assert_eq!(profile.country.as_deref(), Some("US"));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let repo = Arc::new(MockUserRepository::default());
        let svc = service(repo);
        svc.signup(signup("alice@acme.io")).await.unwrap();
        let err = svc.signup(signup("alice@acme.io")).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Input validation failed: Email already registered"
        );
    }

    #[tokio::test]
    async fn authenticate_checks_password_and_active_flag() {
        let repo = Arc::new(MockUserRepository::default());
        let svc = service(repo.clone());
        let user = svc.signup(signup("alice@acme.io")).await.unwrap();

        assert!(svc.authenticate("alice@acme.io", "password123").await.is_ok());
        assert!(matches!(
            svc.authenticate("alice@acme.io", "wrong").await,
            Err(Error::Unauthorized(_))
        ));
        assert!(matches!(
            svc.authenticate("nobody@acme.io", "password123").await,
            Err(Error::Unauthorized(_))
        ));

        repo.set_active(&user.id, false);
        assert!(matches!(
            svc.authenticate("alice@acme.io", "password123").await,
            Err(Error::Forbidden(_))
        ));
    }

    #[tokio::test]
    async fn only_admins_delete_and_never_themselves() {
        let repo = Arc::new(MockUserRepository::default());
        let admin = member("admin", "c1", Role::Admin);
        let reader = member("reader", "c1", Role::Reader);
        let outsider = member("outsider", "c2", Role::Reader);
        repo.insert(admin.clone());
        repo.insert(reader.clone());
        repo.insert(outsider.clone());
        let svc = service(repo);

        assert!(matches!(
            svc.delete_user(&reader, &admin.id).await,
            Err(Error::Forbidden(_))
        ));
        assert!(matches!(
            svc.delete_user(&admin, &admin.id).await,
            Err(Error::Validation(_))
        ));
        assert!(svc.delete_user(&admin, &outsider.id).await.unwrap_err().is_not_found());
        svc.delete_user(&admin, &reader.id).await.unwrap();
        assert!(svc.get_user(&reader.id).is_err());
    }

    #[tokio::test]
    async fn non_admin_cannot_update_others_or_change_role() {
        let repo = Arc::new(MockUserRepository::default());
        let admin = member("admin", "c1", Role::Admin);
        let analyst = member("analyst", "c1", Role::Analyst);
        repo.insert(admin.clone());
        repo.insert(analyst.clone());
        let svc = service(repo);

        let err = svc
            .update_user(&analyst, &admin.id, UserUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Not authorized to update this user");

        let promote = UserUpdate {
            name: None,
            role: Some("admin".into()),
        };
        assert!(matches!(
            svc.update_user(&analyst, &analyst.id, promote.clone()).await,
            Err(Error::Forbidden(_))
        ));
        let updated = svc.update_user(&admin, &analyst.id, promote).await.unwrap();
        assert_eq!(updated.role, Role::Admin);
    }

    #[tokio::test]
    async fn change_password_requires_current_password() {
        let repo = Arc::new(MockUserRepository::default());
        let svc = service(repo);
        let user = svc.signup(signup("alice@acme.io")).await.unwrap();

        let err = svc
            .change_password(
                &user,
                PasswordChange {
                    current_password: "nope".into(),
                    new_password: "another-password".into(),
                },
            )
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Current password is incorrect"));

        svc.change_password(
            &user,
            PasswordChange {
                current_password: "password123".into(),
                new_password: "another-password".into(),
            },
        )
        .await
        .unwrap();
        assert!(svc
            .authenticate("alice@acme.io", "another-password")
            .await
            .is_ok());
    }
}
