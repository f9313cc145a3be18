use async_trait::async_trait;

use super::companies_model::{Company, CompanyUpdate, Invitation};
use crate::errors::Result;
use crate::users::User;

#[async_trait]
pub trait CompanyRepositoryTrait: Send + Sync {
    fn get_by_id(&self, company_id: &str) -> Result<Company>;
    async fn update(&self, company_id: &str, update: CompanyUpdate) -> Result<Company>;
}

/// Account operations. Every method takes the acting user and refuses to
/// touch a company the actor does not belong to.
#[async_trait]
pub trait CompanyServiceTrait: Send + Sync {
    fn get_company(&self, actor: &User, company_id: &str) -> Result<Company>;
    async fn update_company(
        &self,
        actor: &User,
        company_id: &str,
        update: CompanyUpdate,
    ) -> Result<Company>;
    fn list_members(&self, actor: &User, company_id: &str) -> Result<Vec<User>>;
    async fn invite_member(
        &self,
        actor: &User,
        company_id: &str,
        email: &str,
        role: &str,
    ) -> Result<Invitation>;
    async fn remove_member(&self, actor: &User, company_id: &str, member_id: &str) -> Result<()>;
}
