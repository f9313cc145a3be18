use async_trait::async_trait;
use log::warn;
use std::sync::Arc;

use super::activity_model::{ActivityList, NewActivity};
use super::activity_traits::{ActivityRepositoryTrait, ActivityServiceTrait};
use crate::errors::{Error, Result};
use crate::users::User;

pub struct ActivityService {
    repository: Arc<dyn ActivityRepositoryTrait>,
}

impl ActivityService {
    pub fn new(repository: Arc<dyn ActivityRepositoryTrait>) -> Self {
        Self { repository }
    }
}

#[async_trait]
impl ActivityServiceTrait for ActivityService {
    async fn record(&self, activity: NewActivity) {
        let kind = activity.kind.as_str();
        let user_id = activity.user_id.clone();
        if let Err(e) = self.repository.insert(activity).await {
            warn!("Failed to record {} activity for user {}: {}", kind, user_id, e);
        }
    }

    fn user_activity(&self, user: &User, skip: i64, limit: i64) -> Result<ActivityList> {
        self.repository.list_for_user(&user.id, skip, limit)
    }

    fn audit_logs(&self, actor: &User, skip: i64, limit: i64) -> Result<ActivityList> {
        if !actor.is_admin() {
            return Err(Error::forbidden("Only admins can view audit logs"));
        }
        self.repository
            .list_for_company(&actor.company_id, skip, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::{Activity, ActivityKind};
    use crate::users::Role;
    use std::sync::Mutex;

    struct MockActivityRepository {
        rows: Mutex<Vec<Activity>>,
        fail_inserts: bool,
    }

    impl MockActivityRepository {
        fn new(fail_inserts: bool) -> Self {
            Self {
                rows: Mutex::new(Vec::new()),
                fail_inserts,
            }
        }
    }

    #[async_trait]
    impl ActivityRepositoryTrait for MockActivityRepository {
        fn list_for_user(&self, user_id: &str, skip: i64, limit: i64) -> Result<ActivityList> {
            let rows = self.rows.lock().unwrap();
            let matching: Vec<Activity> = rows
                .iter()
                .filter(|a| a.user_id == user_id)
                .cloned()
                .collect();
            let total = matching.len() as i64;
            Ok(ActivityList {
                items: matching
                    .into_iter()
                    .skip(skip as usize)
                    .take(limit as usize)
                    .collect(),
                total,
            })
        }

        fn list_for_company(
            &self,
            company_id: &str,
            _skip: i64,
            _limit: i64,
        ) -> Result<ActivityList> {
            let rows = self.rows.lock().unwrap();
            let items: Vec<Activity> = rows
                .iter()
                .filter(|a| a.company_id.as_deref() == Some(company_id))
                .cloned()
                .collect();
            let total = items.len() as i64;
            Ok(ActivityList { items, total })
        }

        async fn insert(&self, activity: NewActivity) -> Result<Activity> {
            if self.fail_inserts {
                return Err(Error::Unexpected("disk full".into()));
            }
            let row = Activity {
                id: format!("a{}", self.rows.lock().unwrap().len()),
                user_id: activity.user_id,
                company_id: activity.company_id,
                activity_type: activity.kind.as_str().to_string(),
                description: activity.description,
                timestamp: chrono::Utc::now().naive_utc(),
            };
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }
    }

    fn user(id: &str, role: Role) -> User {
        let now = chrono::Utc::now().naive_utc();
        User {
            id: id.into(),
            company_id: "c1".into(),
            email: format!("{}@example.com", id),
            name: id.into(),
            hashed_password: String::new(),
            role,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn records_and_lists_user_activity() {
        let service = ActivityService::new(Arc::new(MockActivityRepository::new(false)));
        let alice = user("alice", Role::Analyst);
        service
            .record(NewActivity::new(
                "alice",
                Some("c1".into()),
                ActivityKind::Login,
                "User logged in",
            ))
            .await;

        let list = service.user_activity(&alice, 0, 50).unwrap();
        assert_eq!(list.total, 1);
        assert_eq!(list.items[0].activity_type, "login");
    }

    #[tokio::test]
    async fn record_swallows_repository_errors() {
        let service = ActivityService::new(Arc::new(MockActivityRepository::new(true)));
        service
            .record(NewActivity::new("bob", None, ActivityKind::Logout, "bye"))
            .await;
    }

    #[test]
    fn audit_logs_require_admin() {
        let service = ActivityService::new(Arc::new(MockActivityRepository::new(false)));
        let err = service
            .audit_logs(&user("r", Role::Reader), 0, 100)
            .unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert!(service.audit_logs(&user("a", Role::Admin), 0, 100).is_ok());
    }
}
