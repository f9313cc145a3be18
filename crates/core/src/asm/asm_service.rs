use async_trait::async_trait;
use chrono::{NaiveDateTime, Utc};
use log::{debug, error, info, warn};
use std::sync::Arc;
use uuid::Uuid;

use super::asm_model::{
    AsmDashboard, AsmDiscovery, AsmDiscoveryRun, AsmDiscoveryUpdate, AsmTrigger,
    DiscoveryStatus, NewAsmDiscovery, RunMode, RunStatus, ScheduleType, TargetSource,
    TriggeredBy,
};
use super::asm_traits::{AsmRepositoryTrait, AsmServiceTrait, PipelineStoreTrait};
use super::pipeline::{generate_pipeline, pipeline_kind, PipelineDocument};
use super::schedule::parse_interval;
use crate::activity::{ActivityKind, ActivityServiceTrait, NewActivity};
use crate::assets::AssetRepositoryTrait;
use crate::constants::{ASM_TRIGGERS_QUEUE, ATTACK_SURFACE_SCORE};
use crate::errors::{Error, Result};
use crate::queue::{publish_json, MessageQueue};
use crate::users::User;
use crate::utils::{Page, PageRequest};

pub struct AsmService {
    repository: Arc<dyn AsmRepositoryTrait>,
    assets: Arc<dyn AssetRepositoryTrait>,
    pipelines: Arc<dyn PipelineStoreTrait>,
    queue: Arc<dyn MessageQueue>,
    queue_name: String,
    activity: Arc<dyn ActivityServiceTrait>,
}

impl AsmService {
    pub fn new(
        repository: Arc<dyn AsmRepositoryTrait>,
        assets: Arc<dyn AssetRepositoryTrait>,
        pipelines: Arc<dyn PipelineStoreTrait>,
        queue: Arc<dyn MessageQueue>,
        activity: Arc<dyn ActivityServiceTrait>,
    ) -> Self {
        Self {
            repository,
            assets,
            pipelines,
            queue,
            queue_name: ASM_TRIGGERS_QUEUE.to_string(),
            activity,
        }
    }

    /// Publishes triggers to `name` instead of the default queue.
    pub fn with_queue_name(mut self, name: impl Into<String>) -> Self {
        self.queue_name = name.into();
        self
    }

    fn not_found(e: Error) -> Error {
        if e.is_not_found() {
            Error::not_found("Discovery not found")
        } else {
            e
        }
    }

    fn next_interval_run(discovery: &AsmDiscovery, from: NaiveDateTime) -> Option<NaiveDateTime> {
        if discovery.schedule_type != ScheduleType::Interval {
            return None;
        }
        let value = discovery.schedule_value.as_deref()?;
        parse_interval(value).ok().map(|interval| from + interval)
    }

    async fn publish_trigger(&self, trigger: &AsmTrigger) -> Result<()> {
        publish_json(self.queue.as_ref(), &self.queue_name, trigger).await?;
        Ok(())
    }
}

#[async_trait]
impl AsmServiceTrait for AsmService {
    async fn create_discovery(
        &self,
        user: &User,
        request: NewAsmDiscovery,
    ) -> Result<AsmDiscovery> {
        request.validate()?;

        let (asset_ids, manual_targets) = match request.target_source {
            TargetSource::FromAsset => {
                let ids = request.asset_ids();
                let owned = self.assets.list_by_ids(&user.id, &ids)?;
                if owned.len() != ids.len() {
                    return Err(Error::invalid("One or more assets not found"));
                }
                (ids, Vec::new())
            }
            TargetSource::ManualEntry => (Vec::new(), request.manual_targets()),
        };

        let now = Utc::now().naive_utc();
        let discovery = AsmDiscovery {
            id: Uuid::new_v4().to_string(),
            user_id: user.id.clone(),
            name: request.name.trim().to_string(),
            asset_type: request.asset_type,
            target_source: request.target_source,
            asset_ids,
            manual_targets,
            intensity: request.intensity,
            schedule_type: request.schedule_type,
            schedule_value: request
                .schedule_value
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            status: DiscoveryStatus::Pending,
            last_run_at: None,
            next_run_at: Some(now),
            created_at: now,
            updated_at: now,
        };
        let discovery = self.repository.insert_discovery(discovery).await?;

        let trigger = AsmTrigger::for_discovery(&discovery, TriggeredBy::Ui, RunMode::Quick);
        if let Err(e) = self.publish_trigger(&trigger).await {
            error!("Failed to publish trigger for discovery {}: {}", discovery.id, e);
            if let Err(cleanup) = self
                .repository
                .delete_discovery(&user.id, &discovery.id)
                .await
            {
                warn!("Failed to roll back discovery {}: {}", discovery.id, cleanup);
            }
            return Err(Error::Unexpected(
                "Not able to schedule this discovery".to_string(),
            ));
        }

        info!("Discovery {} scheduled for user {}", discovery.id, user.id);
        self.activity
            .record(NewActivity::new(
                user.id.clone(),
                Some(user.company_id.clone()),
                ActivityKind::DiscoveryCreated,
                format!("Created discovery {}", discovery.name),
            ))
            .await;
        Ok(discovery)
    }

    fn list_discoveries(&self, user: &User, page: PageRequest) -> Result<Page<AsmDiscovery>> {
        self.repository.list_discoveries(&user.id, page)
    }

    fn get_discovery(&self, user: &User, discovery_id: &str) -> Result<AsmDiscovery> {
        self.repository
            .get_discovery(&user.id, discovery_id)
            .map_err(Self::not_found)
    }

    async fn update_discovery(
        &self,
        user: &User,
        discovery_id: &str,
        update: AsmDiscoveryUpdate,
    ) -> Result<AsmDiscovery> {
        let current = self.get_discovery(user, discovery_id)?;
        let now = Utc::now().naive_utc();
        let mut next = update.apply(&current)?;
        let schedule_changed = next.schedule_type != current.schedule_type
            || next.schedule_value != current.schedule_value;
        if schedule_changed {
            next.next_run_at = Self::next_interval_run(&next, now).or(current.next_run_at);
        }
        next.updated_at = now;
        self.repository
            .update_discovery(next)
            .await
            .map_err(Self::not_found)
    }

    async fn delete_discovery(&self, user: &User, discovery_id: &str) -> Result<AsmDiscovery> {
        let mut discovery = self.get_discovery(user, discovery_id)?;
        if let Err(e) = self.pipelines.delete(&discovery.id).await {
            warn!("Failed to delete pipeline {}: {}", discovery.id, e);
        }
        self.repository
            .delete_discovery(&user.id, &discovery.id)
            .await?;

        self.activity
            .record(NewActivity::new(
                user.id.clone(),
                Some(user.company_id.clone()),
                ActivityKind::DiscoveryDeleted,
                format!("Deleted discovery {}", discovery.name),
            ))
            .await;
        discovery.status = DiscoveryStatus::Deleted;
        Ok(discovery)
    }

    fn list_runs(&self, user: &User, discovery_id: &str) -> Result<Vec<AsmDiscoveryRun>> {
        let discovery = self.get_discovery(user, discovery_id)?;
        self.repository.list_runs(&discovery.id)
    }

    fn get_pipeline(&self, user: &User, discovery_id: &str) -> Result<PipelineDocument> {
        let discovery = self.get_discovery(user, discovery_id)?;
        self.pipelines
            .load(&discovery.id)?
            .ok_or_else(|| Error::not_found("Pipeline not found"))
    }

    fn dashboard(&self, user: &User) -> Result<AsmDashboard> {
        Ok(AsmDashboard {
            attack_surface_score: ATTACK_SURFACE_SCORE,
            total_discoveries: self.repository.count_discoveries(&user.id, None)?,
            active_discoveries: self
                .repository
                .count_discoveries(&user.id, Some(DiscoveryStatus::Active))?,
            last_discovery_run: self.repository.last_run_started_at(&user.id)?,
        })
    }

    async fn trigger_due(&self, now: NaiveDateTime) -> Result<usize> {
        let due = self.repository.list_due_interval(now)?;
        let mut scheduled = 0;
        for discovery in due {
            let Some(next_run_at) = Self::next_interval_run(&discovery, now) else {
                warn!(
                    "Discovery {} has an unusable interval {:?}; skipping",
                    discovery.id, discovery.schedule_value
                );
                continue;
            };
            let trigger =
                AsmTrigger::for_discovery(&discovery, TriggeredBy::Cron, RunMode::Scheduled);
            if let Err(e) = self.publish_trigger(&trigger).await {
                warn!("Failed to publish scheduled run for {}: {}", discovery.id, e);
                continue;
            }
            self.repository
                .set_next_run_at(&discovery.id, next_run_at)
                .await?;
            debug!("Discovery {} next run at {}", discovery.id, next_run_at);
            scheduled += 1;
        }
        Ok(scheduled)
    }

    fn find_discovery(&self, discovery_id: &str) -> Result<AsmDiscovery> {
        self.repository
            .find_discovery(discovery_id)
            .map_err(Self::not_found)
    }

    async fn begin_run(
        &self,
        discovery: &AsmDiscovery,
        triggered_by: TriggeredBy,
        run_mode: RunMode,
    ) -> Result<(AsmDiscoveryRun, PipelineDocument)> {
        let run_id = Uuid::new_v4().to_string();
        let document = generate_pipeline(
            &discovery.id,
            pipeline_kind(discovery.asset_type),
            discovery.intensity,
            RunStatus::Running.as_str(),
        )?;
        self.pipelines.save(&document).await?;

        let now = Utc::now().naive_utc();
        let run = self
            .repository
            .insert_run(AsmDiscoveryRun {
                id: run_id,
                asm_discovery_id: discovery.id.clone(),
                user_id: discovery.user_id.clone(),
                triggered_by,
                run_mode,
                status: RunStatus::Running,
                started_at: Some(now),
                completed_at: None,
                error_message: None,
                summary: None,
                created_at: now,
            })
            .await?;
        self.repository
            .set_discovery_status(&discovery.id, DiscoveryStatus::Running, None)
            .await?;
        Ok((run, document))
    }

    async fn complete_run(
        &self,
        mut run: AsmDiscoveryRun,
        summary: serde_json::Value,
    ) -> Result<AsmDiscoveryRun> {
        let now = Utc::now().naive_utc();
        run.status = RunStatus::Completed;
        run.completed_at = Some(now);
        run.summary = Some(summary);
        let run = self.repository.update_run(run).await?;

        match self.repository.find_discovery(&run.asm_discovery_id) {
            Ok(discovery) => {
                let status = if discovery.status == DiscoveryStatus::Paused {
                    DiscoveryStatus::Paused
                } else {
                    DiscoveryStatus::Active
                };
                self.repository
                    .set_discovery_status(&discovery.id, status, Some(now))
                    .await?;
                if let Some(next_run_at) = Self::next_interval_run(&discovery, now) {
                    self.repository
                        .set_next_run_at(&discovery.id, next_run_at)
                        .await?;
                }
            }
            Err(e) if e.is_not_found() => {
                debug!("Discovery {} was removed during its run", run.asm_discovery_id);
            }
            Err(e) => return Err(e),
        }
        Ok(run)
    }

    async fn fail_run(&self, mut run: AsmDiscoveryRun, error: &str) -> Result<AsmDiscoveryRun> {
        run.status = RunStatus::Failed;
        run.completed_at = Some(Utc::now().naive_utc());
        run.error_message = Some(error.to_string());
        let run = self.repository.update_run(run).await?;

        match self
            .repository
            .set_discovery_status(&run.asm_discovery_id, DiscoveryStatus::Failed, None)
            .await
        {
            Err(e) if !e.is_not_found() => return Err(e),
            _ => {}
        }
        Ok(run)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::{DiscoveryAssetType, Intensity};
    use crate::assets::{Asset, AssetFilter, AssetQuota, AssetUpdate, DiscoveredHost, NewAsset};
    use crate::queue::InMemoryMessageQueue;
    use crate::users::test_support::{member, NoopActivityService};
    use crate::users::Role;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MockAsmRepository {
        discoveries: Mutex<Vec<AsmDiscovery>>,
        runs: Mutex<Vec<AsmDiscoveryRun>>,
    }

    impl MockAsmRepository {
        fn with<R>(&self, id: &str, f: impl FnOnce(&mut AsmDiscovery) -> R) -> Result<R> {
            let mut all = self.discoveries.lock().unwrap();
            let d = all
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or_else(|| Error::not_found("missing"))?;
            Ok(f(d))
        }
    }

    #[async_trait]
    impl AsmRepositoryTrait for MockAsmRepository {
        fn get_discovery(&self, user_id: &str, id: &str) -> Result<AsmDiscovery> {
            self.find_discovery(id)
                .and_then(|d| if d.user_id == user_id { Ok(d) } else { Err(Error::not_found("missing")) })
        }
        fn find_discovery(&self, id: &str) -> Result<AsmDiscovery> {
            self.with(id, |d| d.clone())
        }
        fn list_discoveries(&self, _: &str, _: PageRequest) -> Result<Page<AsmDiscovery>> {
            unimplemented!()
        }
        fn list_due_interval(&self, now: NaiveDateTime) -> Result<Vec<AsmDiscovery>> {
            Ok(self
                .discoveries
                .lock()
                .unwrap()
                .iter()
                .filter(|d| {
                    d.status == DiscoveryStatus::Active
                        && d.schedule_type == ScheduleType::Interval
                        && d.next_run_at.is_some_and(|n| n <= now)
                })
                .cloned()
                .collect())
        }
        fn count_discoveries(&self, user_id: &str, status: Option<DiscoveryStatus>) -> Result<i64> {
            Ok(self
                .discoveries
                .lock()
                .unwrap()
                .iter()
                .filter(|d| d.user_id == user_id && status.map_or(true, |s| d.status == s))
                .count() as i64)
        }
        fn last_run_started_at(&self, _: &str) -> Result<Option<NaiveDateTime>> {
            Ok(self.runs.lock().unwrap().iter().filter_map(|r| r.started_at).max())
        }
        fn list_runs(&self, discovery_id: &str) -> Result<Vec<AsmDiscoveryRun>> {
            let mut runs: Vec<_> = self
                .runs
                .lock()
                .unwrap()
                .iter()
                .filter(|r| r.asm_discovery_id == discovery_id)
                .cloned()
                .collect();
            runs.reverse();
            Ok(runs)
        }
        async fn insert_discovery(&self, discovery: AsmDiscovery) -> Result<AsmDiscovery> {
            self.discoveries.lock().unwrap().push(discovery.clone());
            Ok(discovery)
        }
        async fn update_discovery(&self, discovery: AsmDiscovery) -> Result<AsmDiscovery> {
            let id = discovery.id.clone();
            let updated = discovery.clone();
            self.with(&id, move |d| *d = discovery)?;
            Ok(updated)
        }
        async fn set_discovery_status(
            &self,
            id: &str,
            status: DiscoveryStatus,
            last_run_at: Option<NaiveDateTime>,
        ) -> Result<()> {
            self.with(id, |d| {
                d.status = status;
                if last_run_at.is_some() {
                    d.last_run_at = last_run_at;
                }
            })
        }
        async fn set_next_run_at(&self, id: &str, next_run_at: NaiveDateTime) -> Result<()> {
            self.with(id, |d| d.next_run_at = Some(next_run_at))
        }
        async fn delete_discovery(&self, user_id: &str, id: &str) -> Result<usize> {
            let mut all = self.discoveries.lock().unwrap();
            let before = all.len();
            all.retain(|d| !(d.id == id && d.user_id == user_id));
            self.runs.lock().unwrap().retain(|r| r.asm_discovery_id != id);
            Ok(before - all.len())
        }
        async fn insert_run(&self, run: AsmDiscoveryRun) -> Result<AsmDiscoveryRun> {
            self.runs.lock().unwrap().push(run.clone());
            Ok(run)
        }
        async fn update_run(&self, run: AsmDiscoveryRun) -> Result<AsmDiscoveryRun> {
            let mut runs = self.runs.lock().unwrap();
            if let Some(r) = runs.iter_mut().find(|r| r.id == run.id) {
                *r = run.clone();
            }
            Ok(run)
        }
    }

    #[derive(Default)]
    struct MockPipelineStore {
        docs: Mutex<HashMap<String, PipelineDocument>>,
    }

    #[async_trait]
    impl PipelineStoreTrait for MockPipelineStore {
        fn load(&self, job_id: &str) -> Result<Option<PipelineDocument>> {
            Ok(self.docs.lock().unwrap().get(job_id).cloned())
        }
        async fn save(&self, document: &PipelineDocument) -> Result<()> {
            self.docs
                .lock()
                .unwrap()
                .insert(document.job_id.clone(), document.clone());
            Ok(())
        }
        async fn delete(&self, job_id: &str) -> Result<()> {
            self.docs.lock().unwrap().remove(job_id);
            Ok(())
        }
        async fn purge_expired(&self) -> Result<usize> {
            Ok(0)
        }
    }

    /// Owns exactly the asset ids it was built with.
    struct OwnedAssets(Vec<String>);

    #[async_trait]
    impl AssetRepositoryTrait for OwnedAssets {
        fn get_by_id(&self, _: &str, _: &str) -> Result<Asset> {
            unimplemented!()
        }
        fn search(&self, _: &str, _: &AssetFilter, _: PageRequest) -> Result<Page<Asset>> {
            unimplemented!()
        }
        fn list_by_ids(&self, user_id: &str, ids: &[String]) -> Result<Vec<Asset>> {
            let now = Utc::now().naive_utc();
            Ok(ids
                .iter()
                .filter(|id| self.0.contains(id))
                .map(|id| Asset {
                    id: id.clone(),
                    user_id: user_id.to_string(),
                    name: format!("{}.example.com", id),
                    asset_type: crate::assets::AssetType::Domain,
                    exposure: crate::assets::Exposure::Public,
                    risk_score: 0,
                    tags: vec![],
                    status: crate::assets::AssetStatus::Active,
                    last_seen: None,
                    description: None,
                    created_at: now,
                    updated_at: now,
                })
                .collect())
        }
        async fn create(&self, _: &str, _: NewAsset, _: &AssetQuota) -> Result<Asset> {
            unimplemented!()
        }
        async fn update(&self, _: &str, _: &str, _: AssetUpdate) -> Result<Asset> {
            unimplemented!()
        }
        async fn delete(&self, _: &str, _: &str) -> Result<usize> {
            unimplemented!()
        }
        async fn upsert_discovered(
            &self,
            _: &str,
            _: Vec<DiscoveredHost>,
            _: &AssetQuota,
        ) -> Result<usize> {
            unimplemented!()
        }
    }

    struct Fixture {
        repo: Arc<MockAsmRepository>,
        pipelines: Arc<MockPipelineStore>,
        queue: Arc<InMemoryMessageQueue>,
        service: AsmService,
        user: User,
    }

    fn fixture() -> Fixture {
        let repo = Arc::new(MockAsmRepository::default());
        let pipelines = Arc::new(MockPipelineStore::default());
        let queue = Arc::new(InMemoryMessageQueue::new());
        let service = AsmService::new(
            repo.clone(),
            Arc::new(OwnedAssets(vec!["a1".into()])),
            pipelines.clone(),
            queue.clone(),
            Arc::new(NoopActivityService),
        );
        Fixture {
            repo,
            pipelines,
            queue,
            service,
            user: member("u1", "c1", Role::Analyst),
        }
    }

    fn manual(schedule: serde_json::Value) -> NewAsmDiscovery {
        let mut body = json!({
            "name": "Corp",
            "asset_type": "domain",
            "target_source": "MANUAL_ENTRY",
            "manual_targets": ["example.com"],
            "intensity": "LIGHT"
        });
        if let (Some(body), Some(extra)) = (body.as_object_mut(), schedule.as_object()) {
            body.extend(extra.clone());
        }
        serde_json::from_value(body).unwrap()
    }

    #[tokio::test]
    async fn create_persists_and_publishes_trigger() {
        let f = fixture();
        let d = f
            .service
            .create_discovery(&f.user, manual(json!({})))
            .await
            .unwrap();
        assert_eq!(d.status, DiscoveryStatus::Pending);
        assert!(d.next_run_at.is_some());

        let pending = f.queue.pending(ASM_TRIGGERS_QUEUE).await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0]["type"], "asm");
        assert_eq!(pending[0]["asm_discovery_id"], d.id.as_str());
        assert_eq!(pending[0]["triggered_by"], "UI");
        assert_eq!(pending[0]["run_mode"], "QUICK");
        assert_eq!(pending[0]["intensity"], "LIGHT");
    }

    #[tokio::test]
    async fn create_rolls_back_when_queue_is_down() {
        let f = fixture();
        f.queue.set_unavailable(true);
        let err = f
            .service
            .create_discovery(&f.user, manual(json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Unexpected(ref m) if m == "Not able to schedule this discovery"));
        assert!(f.repo.discoveries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn create_from_assets_checks_ownership() {
        let f = fixture();
        let request: NewAsmDiscovery = serde_json::from_value(json!({
            "name": "Corp",
            "asset_type": "domain",
            "target_source": "FROM_ASSET",
            "asset_ids": ["a1", "not-mine"]
        }))
        .unwrap();
        assert!(f.service.create_discovery(&f.user, request).await.is_err());

        let request: NewAsmDiscovery = serde_json::from_value(json!({
            "name": "Corp",
            "asset_type": "domain",
            "target_source": "FROM_ASSET",
            "asset_ids": ["a1"]
        }))
        .unwrap();
        let d = f.service.create_discovery(&f.user, request).await.unwrap();
        assert_eq!(d.asset_ids, vec!["a1".to_string()]);
        assert!(d.manual_targets.is_empty());
    }

    #[tokio::test]
    async fn other_users_cannot_see_discovery() {
        let f = fixture();
        let d = f
            .service
            .create_discovery(&f.user, manual(json!({})))
            .await
            .unwrap();
        let stranger = member("u2", "c2", Role::Admin);
        let err = f.service.get_discovery(&stranger, &d.id).unwrap_err();
        assert_eq!(err.to_string(), "Discovery not found");
        assert!(f.service.delete_discovery(&stranger, &d.id).await.is_err());
    }

    #[tokio::test]
    async fn run_lifecycle_updates_discovery_and_pipeline() {
        let f = fixture();
        let d = f
            .service
            .create_discovery(&f.user, manual(json!({})))
            .await
            .unwrap();

        let (run, doc) = f
            .service
            .begin_run(&d, TriggeredBy::Ui, RunMode::Quick)
            .await
            .unwrap();
        assert_eq!(run.status, RunStatus::Running);
        assert_eq!(doc.job_id, d.id);
        assert_eq!(doc.asset_type, "domain");
        assert_eq!(
            f.service.find_discovery(&d.id).unwrap().status,
            DiscoveryStatus::Running
        );
        assert_eq!(f.service.get_pipeline(&f.user, &d.id).unwrap(), doc);

        let run = f
            .service
            .complete_run(run, json!({"hosts_found": 2, "tools_run": 2}))
            .await
            .unwrap();
        assert_eq!(run.status, RunStatus::Completed);
        let d = f.service.find_discovery(&d.id).unwrap();
        assert_eq!(d.status, DiscoveryStatus::Active);
        assert!(d.last_run_at.is_some());

        let dashboard = f.service.dashboard(&f.user).unwrap();
        assert_eq!(dashboard.attack_surface_score, 75);
        assert_eq!(dashboard.total_discoveries, 1);
        assert_eq!(dashboard.active_discoveries, 1);
        assert!(dashboard.last_discovery_run.is_some());
    }

    #[tokio::test]
    async fn failed_run_marks_discovery_failed() {
        let f = fixture();
        let d = f
            .service
            .create_discovery(&f.user, manual(json!({})))
            .await
            .unwrap();
        let (run, _) = f
            .service
            .begin_run(&d, TriggeredBy::Api, RunMode::Quick)
            .await
            .unwrap();
        let run = f.service.fail_run(run, "timed out").await.unwrap();
        assert_eq!(run.error_message.as_deref(), Some("timed out"));
        assert_eq!(
            f.service.find_discovery(&d.id).unwrap().status,
            DiscoveryStatus::Failed
        );
    }

    #[tokio::test]
    async fn delete_removes_runs_and_pipelines() {
        let f = fixture();
        let d = f
            .service
            .create_discovery(&f.user, manual(json!({})))
            .await
            .unwrap();
        f.service
            .begin_run(&d, TriggeredBy::Ui, RunMode::Quick)
            .await
            .unwrap();
        assert!(f.pipelines.load(&d.id).unwrap().is_some());
        let deleted = f.service.delete_discovery(&f.user, &d.id).await.unwrap();
        assert_eq!(deleted.status, DiscoveryStatus::Deleted);
        assert!(f.pipelines.load(&d.id).unwrap().is_none());
        assert!(f.repo.runs.lock().unwrap().is_empty());
        let err = f.service.get_pipeline(&f.user, &d.id).unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn scheduler_triggers_due_interval_discoveries() {
        let f = fixture();
        let d = f
            .service
            .create_discovery(
                &f.user,
                manual(json!({"schedule_type": "INTERVAL", "schedule_value": "2h"})),
            )
            .await
            .unwrap();
        // Not yet ACTIVE, so nothing is due.
        let now = Utc::now().naive_utc();
        assert_eq!(f.service.trigger_due(now).await.unwrap(), 0);

        f.service
            .update_discovery(
                &f.user,
                &d.id,
                AsmDiscoveryUpdate {
                    status: Some(DiscoveryStatus::Active),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(f.service.trigger_due(now).await.unwrap(), 1);

        let pending = f.queue.pending(ASM_TRIGGERS_QUEUE).await;
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[1]["triggered_by"], "CRON");
        assert_eq!(pending[1]["run_mode"], "SCHEDULED");

        let d = f.service.find_discovery(&d.id).unwrap();
        assert_eq!(d.next_run_at, Some(now + chrono::Duration::hours(2)));
        assert_eq!(f.service.trigger_due(now).await.unwrap(), 0);
    }

    #[test]
    fn saas_discoveries_use_service_tools() {
        assert_eq!(pipeline_kind(DiscoveryAssetType::Saas), "service");
        let doc = generate_pipeline("j", "service", Intensity::Normal, "RUNNING").unwrap();
        assert_eq!(doc.pipeline[0].tool, "top_ports_services");
    }
}
