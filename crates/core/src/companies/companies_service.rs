use async_trait::async_trait;
use log::info;
use std::str::FromStr;
use std::sync::Arc;

use super::companies_model::{Company, CompanyUpdate, Invitation};
use super::companies_traits::{CompanyRepositoryTrait, CompanyServiceTrait};
use crate::activity::{ActivityKind, ActivityServiceTrait, NewActivity};
use crate::errors::{Error, Result};
use crate::users::{Role, User, UserRepositoryTrait};
use crate::utils::validation::validate_email;

pub struct CompanyService {
    repository: Arc<dyn CompanyRepositoryTrait>,
    users: Arc<dyn UserRepositoryTrait>,
    activity: Arc<dyn ActivityServiceTrait>,
}

impl CompanyService {
    pub fn new(
        repository: Arc<dyn CompanyRepositoryTrait>,
        users: Arc<dyn UserRepositoryTrait>,
        activity: Arc<dyn ActivityServiceTrait>,
    ) -> Self {
        Self {
            repository,
            users,
            activity,
        }
    }

    fn ensure_member(actor: &User, company_id: &str, message: &str) -> Result<()> {
        if actor.company_id != company_id {
            return Err(Error::forbidden(message));
        }
        Ok(())
    }

    fn ensure_admin(actor: &User, message: &str) -> Result<()> {
        if !actor.is_admin() {
            return Err(Error::forbidden(message));
        }
        Ok(())
    }

    async fn record(&self, actor: &User, kind: ActivityKind, description: String) {
        self.activity
            .record(NewActivity::new(
                actor.id.clone(),
                Some(actor.company_id.clone()),
                kind,
                description,
            ))
            .await;
    }
}

#[async_trait]
impl CompanyServiceTrait for CompanyService {
    fn get_company(&self, actor: &User, company_id: &str) -> Result<Company> {
        Self::ensure_member(actor, company_id, "Not authorized to access this account")?;
        self.repository.get_by_id(company_id)
    }

    async fn update_company(
        &self,
        actor: &User,
        company_id: &str,
        update: CompanyUpdate,
    ) -> Result<Company> {
        Self::ensure_admin(actor, "Only admins can update account")?;
        Self::ensure_member(actor, company_id, "Not authorized to update this account")?;
        update.validate()?;
        self.repository.get_by_id(company_id)?;

        let company = self.repository.update(company_id, update).await?;
        self.record(
            actor,
            ActivityKind::AccountUpdate,
            format!("Updated account {}", company.name),
        )
        .await;
        Ok(company)
    }

    fn list_members(&self, actor: &User, company_id: &str) -> Result<Vec<User>> {
        Self::ensure_member(actor, company_id, "Not authorized to view members")?;
        self.users.list_by_company(company_id, 0, i64::MAX)
    }

    async fn invite_member(
        &self,
        actor: &User,
        company_id: &str,
        email: &str,
        role: &str,
    ) -> Result<Invitation> {
        Self::ensure_admin(actor, "Only admins can invite members")?;
        Self::ensure_member(actor, company_id, "Not authorized to invite to this account")?;
        validate_email(email)?;
        let role = Role::from_str(role)?;

        let email = email.trim().to_lowercase();
        info!("Invitation for {} ({}) to company {}", email, role, company_id);
        self.record(
            actor,
            ActivityKind::MemberInvited,
            format!("Invited {} as {}", email, role),
        )
        .await;
        Ok(Invitation {
            email,
            role: role.as_str().to_string(),
        })
    }

    async fn remove_member(&self, actor: &User, company_id: &str, member_id: &str) -> Result<()> {
        Self::ensure_admin(actor, "Only admins can remove members")?;
        Self::ensure_member(actor, company_id, "Not authorized")?;
        if actor.id == member_id {
            return Err(Error::invalid("Cannot remove yourself"));
        }

        let member = match self.users.get_by_id(member_id) {
            Ok(user) if user.company_id == company_id => user,
            Ok(_) => return Err(Error::not_found("Member not found")),
            Err(e) if e.is_not_found() => return Err(Error::not_found("Member not found")),
            Err(e) => return Err(e),
        };

        self.users.delete(&member.id).await?;
        self.record(
            actor,
            ActivityKind::MemberRemoved,
            format!("Removed member {}", member.email),
        )
        .await;
        Ok(())
    }
}
