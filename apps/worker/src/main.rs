use std::sync::Arc;

use cybersentinel_core::scans::StubScanner;
use cybersentinel_worker::{
    build_context,
    config::WorkerConfig,
    consumers::{run_consumer, AsmTriggerHandler, ScanJobHandler},
    control_plane,
    dispatcher::{HttpDispatcher, JobDispatcher, LocalDispatcher},
    executor::Executor,
    init_tracing,
    job_manager::JobManager,
    tools::ToolRegistry,
};
use tokio::sync::watch;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = WorkerConfig::from_env()?;
    init_tracing();
    let ctx = build_context(&config).await?;

    let tools = Arc::new(ToolRegistry::with_defaults(
        config.executor_bin_path.as_deref(),
    ));
    let executor = Arc::new(Executor::new(ctx.clone(), tools));
    let manager = Arc::new(JobManager::new(
        ctx.asm_service.clone(),
        executor,
        config.job_max_concurrency,
        config.task_timeout,
    ));

    let dispatcher: Arc<dyn JobDispatcher> = match &config.asm_service_endpoint {
        Some(endpoint) => {
            tracing::info!("Forwarding ASM jobs to {}", endpoint);
            Arc::new(HttpDispatcher::new(endpoint.clone())?)
        }
        None => Arc::new(LocalDispatcher::new(manager.clone())),
    };

    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let asm_consumer = tokio::spawn(run_consumer(
        ctx.queue.clone(),
        config.asm_queue.clone(),
        Arc::new(AsmTriggerHandler::new(dispatcher)),
        config.poll_interval,
        shutdown_rx.clone(),
    ));
    let vs_consumer = tokio::spawn(run_consumer(
        ctx.queue.clone(),
        config.vs_queue.clone(),
        Arc::new(ScanJobHandler::new(
            ctx.scan_service.clone(),
            Arc::new(StubScanner),
        )),
        config.poll_interval,
        shutdown_rx.clone(),
    ));

    let listener = tokio::net::TcpListener::bind(config.control_plane_addr).await?;
    tracing::info!("Control plane listening on {}", config.control_plane_addr);
    let router = control_plane::router(manager);
    let mut server_shutdown = shutdown_rx;
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(async move {
                let _ = server_shutdown.wait_for(|stop| *stop).await;
            })
            .await
    });

    tokio::signal::ctrl_c().await?;
    tracing::info!("Shutdown requested");
    shutdown_tx.send(true)?;

    let _ = tokio::join!(asm_consumer, vs_consumer);
    server.await??;
    Ok(())
}
