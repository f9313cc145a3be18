use async_trait::async_trait;

use super::activity_model::{Activity, ActivityList, NewActivity};
use crate::errors::Result;
use crate::users::User;

#[async_trait]
pub trait ActivityRepositoryTrait: Send + Sync {
    fn list_for_user(&self, user_id: &str, skip: i64, limit: i64) -> Result<ActivityList>;
    fn list_for_company(&self, company_id: &str, skip: i64, limit: i64) -> Result<ActivityList>;
    async fn insert(&self, activity: NewActivity) -> Result<Activity>;
}

#[async_trait]
pub trait ActivityServiceTrait: Send + Sync {
    /// Best effort: a failure to record is logged, never propagated.
    async fn record(&self, activity: NewActivity);
    fn user_activity(&self, user: &User, skip: i64, limit: i64) -> Result<ActivityList>;
    /// Company-wide log, restricted to admins.
    fn audit_logs(&self, actor: &User, skip: i64, limit: i64) -> Result<ActivityList>;
}
