use std::sync::Arc;

use cybersentinel_core::{
    activity::{ActivityService, ActivityServiceTrait},
    asm::{AsmService, AsmServiceTrait, PipelineStoreTrait},
    assets::{AssetService, AssetServiceTrait},
    queue::MessageQueue,
    scans::{ScanService, ScanServiceTrait},
    users::UserRepositoryTrait,
};
use cybersentinel_storage_sqlite::{
    db, ActivityRepository, AsmRepository, AssetRepository, CompanyRepository, QueueOptions,
    ScanRepository, SqliteMessageQueue, SqlitePipelineStore, UserRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::config::WorkerConfig;

/// Services shared by the consumers, the job manager and the executor.
#[derive(Clone)]
pub struct WorkerContext {
    pub queue: Arc<dyn MessageQueue>,
    pub users: Arc<dyn UserRepositoryTrait>,
    pub asm_service: Arc<dyn AsmServiceTrait>,
    pub asset_service: Arc<dyn AssetServiceTrait>,
    pub scan_service: Arc<dyn ScanServiceTrait>,
    pub pipeline_store: Arc<dyn PipelineStoreTrait>,
}

pub fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if log_format.eq_ignore_ascii_case("json") {
        registry
            .with(fmt::layer().json().with_current_span(false))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_line_number(true))
            .init();
    }
}

pub async fn build_context(config: &WorkerConfig) -> anyhow::Result<WorkerContext> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Worker database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let visibility_timeout = chrono::Duration::from_std(config.visibility_timeout)?;
    let queue: Arc<dyn MessageQueue> = Arc::new(SqliteMessageQueue::with_options(
        pool.clone(),
        writer.clone(),
        QueueOptions {
            visibility_timeout,
            max_attempts: config.max_attempts,
        },
    ));
    let pipeline_store: Arc<dyn PipelineStoreTrait> =
        Arc::new(SqlitePipelineStore::new(pool.clone(), writer.clone()));

    let activity_service: Arc<dyn ActivityServiceTrait> = Arc::new(ActivityService::new(
        Arc::new(ActivityRepository::new(pool.clone(), writer.clone())),
    ));
    let users = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let asset_repository = Arc::new(AssetRepository::new(pool.clone(), writer.clone()));
    let company_repository = Arc::new(CompanyRepository::new(pool.clone(), writer.clone()));

    let asset_service = Arc::new(AssetService::new(
        asset_repository.clone(),
        company_repository,
        activity_service.clone(),
    ));
    let asm_service = Arc::new(
        AsmService::new(
            Arc::new(AsmRepository::new(pool.clone(), writer.clone())),
            asset_repository,
            pipeline_store.clone(),
            queue.clone(),
            activity_service.clone(),
        )
        .with_queue_name(&config.asm_queue),
    );
    let scan_service = Arc::new(
        ScanService::new(
            Arc::new(ScanRepository::new(pool.clone(), writer.clone())),
            queue.clone(),
            activity_service,
        )
        .with_queue_name(&config.vs_queue),
    );

    Ok(WorkerContext {
        queue,
        users,
        asm_service,
        asset_service,
        scan_service,
        pipeline_store,
    })
}
