use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use impresso::application::ports::{BlobStore, JobRepository};
use impresso::application::services::{StylizeWorker, WorkerSettings};
use impresso::infrastructure::observability::{TracingConfig, init_tracing};
use impresso::infrastructure::persistence::{FileJobRepository, MemoryJobRepository};
use impresso::infrastructure::prediction::ReplicateClient;
use impresso::infrastructure::storage::LocalBlobStore;
use impresso::presentation::config::JobStoreBackend;
use impresso::presentation::{AppState, Environment, Settings, create_router};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let environment: Environment = std::env::var("APP_ENVIRONMENT")
        .unwrap_or_else(|_| "local".into())
        .try_into()
        .map_err(|e: String| anyhow::anyhow!(e))?;

    let settings = Settings::load(environment)?;

    init_tracing(
        TracingConfig::for_environment(environment),
        settings.server.port,
    );

    if !settings.replicate.is_configured() {
        tracing::warn!("Replicate token not set; only pass-through presets will be served");
    }

    let uploads: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(PathBuf::from(
        &settings.storage.upload_dir,
    ))?);
    let results: Arc<dyn BlobStore> = Arc::new(LocalBlobStore::new(PathBuf::from(
        &settings.storage.result_dir,
    ))?);

    let job_repository: Arc<dyn JobRepository> = match settings.jobs.backend {
        JobStoreBackend::Memory => Arc::new(MemoryJobRepository::new()),
        JobStoreBackend::File => Arc::new(FileJobRepository::new(PathBuf::from(
            &settings.storage.result_dir,
        ))?),
    };

    let prediction_client = Arc::new(ReplicateClient::new(
        &settings.replicate.base_url,
        settings.replicate.token.clone(),
    ));

    let (stylize_sender, stylize_receiver) = mpsc::channel(settings.jobs.queue_capacity);
    let shutdown = CancellationToken::new();

    let worker = StylizeWorker::new(
        stylize_receiver,
        Arc::clone(&uploads),
        Arc::clone(&results),
        prediction_client,
        Arc::clone(&job_repository),
        WorkerSettings {
            model_version: settings.replicate.model_version.clone(),
            poll_interval: settings.replicate.poll_interval(),
            poll_timeout: settings.replicate.poll_timeout(),
        },
        shutdown.clone(),
    );
    let worker_handle = tokio::spawn(worker.run());

    let state = AppState {
        job_repository,
        uploads,
        results,
        stylize_sender,
        settings: settings.clone(),
    };
    let router = create_router(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!("Listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    let _ = worker_handle.await;

    Ok(())
}

async fn shutdown_signal(token: CancellationToken) {
    if tokio::signal::ctrl_c().await.is_err() {
        tracing::error!("Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
    token.cancel();
}
