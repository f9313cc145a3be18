use std::sync::Arc;

use cybersentinel_core::{
    activity::{ActivityService, ActivityServiceTrait},
    asm::{AsmService, AsmServiceTrait, PipelineStoreTrait},
    assets::{AssetService, AssetServiceTrait},
    billing::{BillingService, BillingServiceTrait},
    catalog::{CatalogService, CatalogServiceTrait},
    companies::{CompanyService, CompanyServiceTrait},
    queue::MessageQueue,
    scans::{ScanService, ScanServiceTrait},
    settings::{SettingsService, SettingsServiceTrait},
    tasks::{TaskService, TaskServiceTrait},
    users::{UserService, UserServiceTrait},
};
use cybersentinel_storage_sqlite::{
    db, ActivityRepository, AsmRepository, AssetRepository, BillingRepository,
    CompanyRepository, ScanRepository, SettingsRepository, SqliteMessageQueue,
    SqlitePipelineStore, TaskRepository, UserRepository,
};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

use crate::{
    auth::{Argon2Hasher, AuthManager},
    config::Config,
};

pub struct AppState {
    pub auth: Arc<AuthManager>,
    pub user_service: Arc<dyn UserServiceTrait>,
    pub company_service: Arc<dyn CompanyServiceTrait>,
    pub activity_service: Arc<dyn ActivityServiceTrait>,
    pub asset_service: Arc<dyn AssetServiceTrait>,
    pub asm_service: Arc<dyn AsmServiceTrait>,
    pub pipeline_store: Arc<dyn PipelineStoreTrait>,
    pub scan_service: Arc<dyn ScanServiceTrait>,
    pub billing_service: Arc<dyn BillingServiceTrait>,
    pub catalog_service: Arc<dyn CatalogServiceTrait>,
    pub settings_service: Arc<dyn SettingsServiceTrait>,
    pub task_service: Arc<dyn TaskServiceTrait>,
    pub queue: Arc<dyn MessageQueue>,
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

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = db::spawn_writer((*pool).clone());

    let activity_repository = Arc::new(ActivityRepository::new(pool.clone(), writer.clone()));
    let activity_service: Arc<dyn ActivityServiceTrait> =
        Arc::new(ActivityService::new(activity_repository));

    let user_repository = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let company_repository = Arc::new(CompanyRepository::new(pool.clone(), writer.clone()));
    let asset_repository = Arc::new(AssetRepository::new(pool.clone(), writer.clone()));
    let asm_repository = Arc::new(AsmRepository::new(pool.clone(), writer.clone()));
    let scan_repository = Arc::new(ScanRepository::new(pool.clone(), writer.clone()));
    let billing_repository = Arc::new(BillingRepository::new(pool.clone(), writer.clone()));
    let settings_repository = Arc::new(SettingsRepository::new(pool.clone(), writer.clone()));
    let task_repository = Arc::new(TaskRepository::new(pool.clone(), writer.clone()));

    let queue: Arc<dyn MessageQueue> =
        Arc::new(SqliteMessageQueue::new(pool.clone(), writer.clone()));
    let pipeline_store: Arc<dyn PipelineStoreTrait> =
        Arc::new(SqlitePipelineStore::new(pool.clone(), writer.clone()));

    let user_service = Arc::new(UserService::new(
        user_repository.clone(),
        Arc::new(Argon2Hasher),
        activity_service.clone(),
    ));
    let company_service = Arc::new(CompanyService::new(
        company_repository.clone(),
        user_repository,
        activity_service.clone(),
    ));
    let asset_service = Arc::new(AssetService::new(
        asset_repository.clone(),
        company_repository,
        activity_service.clone(),
    ));
    let asm_service = Arc::new(
        AsmService::new(
            asm_repository,
            asset_repository,
            pipeline_store.clone(),
            queue.clone(),
            activity_service.clone(),
        )
        .with_queue_name(&config.asm_queue),
    );
    let scan_service = Arc::new(
        ScanService::new(scan_repository, queue.clone(), activity_service.clone())
            .with_queue_name(&config.vs_queue),
    );
    let settings_service = Arc::new(SettingsService::new(
        settings_repository,
        activity_service.clone(),
    ));

    let auth = Arc::new(AuthManager::new(
        &config.jwt_secret,
        config.access_token_ttl,
        config.refresh_token_ttl,
    ));

    Ok(Arc::new(AppState {
        auth,
        user_service,
        company_service,
        activity_service,
        asset_service,
        asm_service,
        pipeline_store,
        scan_service,
        billing_service: Arc::new(BillingService::new(billing_repository)),
        catalog_service: Arc::new(CatalogService::new()),
        settings_service,
        task_service: Arc::new(TaskService::new(task_repository)),
        queue,
    }))
}
