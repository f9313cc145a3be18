use async_trait::async_trait;
use chrono::NaiveDateTime;

use super::asm_model::{
    AsmDashboard, AsmDiscovery, AsmDiscoveryRun, AsmDiscoveryUpdate, DiscoveryStatus,
    NewAsmDiscovery, RunMode, TriggeredBy,
};
use super::pipeline::PipelineDocument;
use crate::errors::Result;
use crate::users::User;
use crate::utils::{Page, PageRequest};

#[async_trait]
pub trait AsmRepositoryTrait: Send + Sync {
    fn get_discovery(&self, user_id: &str, discovery_id: &str) -> Result<AsmDiscovery>;
    /// Unscoped lookup used by the worker.
    fn find_discovery(&self, discovery_id: &str) -> Result<AsmDiscovery>;
    fn list_discoveries(&self, user_id: &str, page: PageRequest) -> Result<Page<AsmDiscovery>>;
    /// ACTIVE interval discoveries whose `next_run_at` has passed.
    fn list_due_interval(&self, now: NaiveDateTime) -> Result<Vec<AsmDiscovery>>;
    fn count_discoveries(&self, user_id: &str, status: Option<DiscoveryStatus>) -> Result<i64>;
    fn last_run_started_at(&self, user_id: &str) -> Result<Option<NaiveDateTime>>;
    /// Runs of a discovery, newest first.
    fn list_runs(&self, discovery_id: &str) -> Result<Vec<AsmDiscoveryRun>>;

    async fn insert_discovery(&self, discovery: AsmDiscovery) -> Result<AsmDiscovery>;
    async fn update_discovery(&self, discovery: AsmDiscovery) -> Result<AsmDiscovery>;
    async fn set_discovery_status(
        &self,
        discovery_id: &str,
        status: DiscoveryStatus,
        last_run_at: Option<NaiveDateTime>,
    ) -> Result<()>;
    async fn set_next_run_at(&self, discovery_id: &str, next_run_at: NaiveDateTime)
        -> Result<()>;
    /// Deletes the discovery together with its runs.
    async fn delete_discovery(&self, user_id: &str, discovery_id: &str) -> Result<usize>;
    async fn insert_run(&self, run: AsmDiscoveryRun) -> Result<AsmDiscoveryRun>;
    async fn update_run(&self, run: AsmDiscoveryRun) -> Result<AsmDiscoveryRun>;
}

/// Short-lived storage for pipeline documents, keyed by job id.
#[async_trait]
pub trait PipelineStoreTrait: Send + Sync {
    /// Returns `None` when the document is missing or expired.
    fn load(&self, job_id: &str) -> Result<Option<PipelineDocument>>;
    async fn save(&self, document: &PipelineDocument) -> Result<()>;
    async fn delete(&self, job_id: &str) -> Result<()>;
    async fn purge_expired(&self) -> Result<usize>;
}

#[async_trait]
pub trait AsmServiceTrait: Send + Sync {
    async fn create_discovery(&self, user: &User, request: NewAsmDiscovery)
        -> Result<AsmDiscovery>;
    fn list_discoveries(&self, user: &User, page: PageRequest) -> Result<Page<AsmDiscovery>>;
    fn get_discovery(&self, user: &User, discovery_id: &str) -> Result<AsmDiscovery>;
    async fn update_discovery(
        &self,
        user: &User,
        discovery_id: &str,
        update: AsmDiscoveryUpdate,
    ) -> Result<AsmDiscovery>;
    async fn delete_discovery(&self, user: &User, discovery_id: &str) -> Result<AsmDiscovery>;
    fn list_runs(&self, user: &User, discovery_id: &str) -> Result<Vec<AsmDiscoveryRun>>;
    fn get_pipeline(&self, user: &User, discovery_id: &str) -> Result<PipelineDocument>;
    fn dashboard(&self, user: &User) -> Result<AsmDashboard>;

    /// Publishes triggers for due interval discoveries. Returns how many were
    /// scheduled.
    async fn trigger_due(&self, now: NaiveDateTime) -> Result<usize>;

    fn find_discovery(&self, discovery_id: &str) -> Result<AsmDiscovery>;
    /// Creates the run and its pipeline and marks the discovery RUNNING.
    async fn begin_run(
        &self,
        discovery: &AsmDiscovery,
        triggered_by: TriggeredBy,
        run_mode: RunMode,
    ) -> Result<(AsmDiscoveryRun, PipelineDocument)>;
    async fn complete_run(
        &self,
        run: AsmDiscoveryRun,
        summary: serde_json::Value,
    ) -> Result<AsmDiscoveryRun>;
    async fn fail_run(&self, run: AsmDiscoveryRun, error: &str) -> Result<AsmDiscoveryRun>;
}
