use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use impresso::application::ports::{BlobStore, JobRepository};
use impresso::application::services::{StylizeMessage, StylizeWorker, WorkerSettings};
use impresso::domain::{ImageFormat, Job, JobId, JobStatus, Preset, StoragePath};
use impresso::infrastructure::persistence::MemoryJobRepository;
use impresso::infrastructure::storage::LocalBlobStore;

use crate::helpers::{MockBehavior, MockPredictionClient};

struct WorkerFixture {
    uploads: Arc<dyn BlobStore>,
    results: Arc<dyn BlobStore>,
    job_repository: Arc<dyn JobRepository>,
    prediction_client: Arc<MockPredictionClient>,
    sender: mpsc::Sender<StylizeMessage>,
    worker_handle: tokio::task::JoinHandle<()>,
    shutdown: CancellationToken,
    _upload_dir: tempfile::TempDir,
    _result_dir: tempfile::TempDir,
}

fn spawn_worker(behavior: MockBehavior, poll_timeout: Duration) -> WorkerFixture {
    let upload_dir = tempfile::TempDir::new().unwrap();
    let result_dir = tempfile::TempDir::new().unwrap();

    let uploads: Arc<dyn BlobStore> =
        Arc::new(LocalBlobStore::new(upload_dir.path().to_path_buf()).unwrap());
    let results: Arc<dyn BlobStore> =
        Arc::new(LocalBlobStore::new(result_dir.path().to_path_buf()).unwrap());
    let job_repository: Arc<dyn JobRepository> = Arc::new(MemoryJobRepository::new());
    let prediction_client = Arc::new(MockPredictionClient::new(behavior));

    let (sender, receiver) = mpsc::channel(4);
    let shutdown = CancellationToken::new();

    let worker = StylizeWorker::new(
        receiver,
        Arc::clone(&uploads),
        Arc::clone(&results),
        Arc::clone(&prediction_client),
        Arc::clone(&job_repository),
        WorkerSettings {
            model_version: "test-version".to_string(),
            poll_interval: Duration::from_millis(10),
            poll_timeout,
        },
        shutdown.clone(),
    );
    let worker_handle = tokio::spawn(worker.run());

    WorkerFixture {
        uploads,
        results,
        job_repository,
        prediction_client,
        sender,
        worker_handle,
        shutdown,
        _upload_dir: upload_dir,
        _result_dir: result_dir,
    }
}

async fn stage_job(fixture: &WorkerFixture, preset: Preset, data: &[u8]) -> (Job, StoragePath) {
    let job = Job::new(preset.name().to_string());
    fixture.job_repository.create(&job).await.unwrap();

    let upload_path = StoragePath::for_job(job.id, "jpg");
    fixture
        .uploads
        .store_bytes(&upload_path, Bytes::copy_from_slice(data))
        .await
        .unwrap();

    (job, upload_path)
}

#[tokio::test]
async fn given_pass_through_job_when_processed_then_result_is_byte_identical() {
    let fixture = spawn_worker(MockBehavior::SucceedAfter(0), Duration::from_secs(2));
    let input = b"jpeg-payload".to_vec();
    let (job, upload_path) = stage_job(&fixture, Preset::Original, &input).await;

    fixture
        .sender
        .send(StylizeMessage {
            job_id: job.id,
            preset: Preset::Original,
            upload_path: upload_path.clone(),
            format: ImageFormat::Jpeg,
        })
        .await
        .unwrap();
    drop(fixture.sender);
    fixture.worker_handle.await.unwrap();

    let stored = fixture
        .job_repository
        .get_by_id(job.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, JobStatus::Done);
    assert!(stored.finished_at.is_some());

    let filename = stored.filename.unwrap();
    let result = fixture
        .results
        .fetch(&StoragePath::from_raw(filename))
        .await
        .unwrap();
    assert_eq!(result.as_ref(), input.as_slice());

    // The staged upload is gone after the terminal transition.
    assert!(fixture.uploads.fetch(&upload_path).await.is_err());
    // No external call is made for pass-through.
    assert_eq!(
        fixture
            .prediction_client
            .polls
            .load(std::sync::atomic::Ordering::SeqCst),
        0
    );
}

#[tokio::test]
async fn given_stylize_job_when_prediction_succeeds_then_artifact_is_downloaded() {
    let fixture = spawn_worker(MockBehavior::SucceedAfter(1), Duration::from_secs(2));
    let (job, upload_path) = stage_job(&fixture, Preset::Monet, b"input-bytes").await;

    fixture
        .sender
        .send(StylizeMessage {
            job_id: job.id,
            preset: Preset::Monet,
            upload_path,
            format: ImageFormat::Jpeg,
        })
        .await
        .unwrap();
    drop(fixture.sender);
    fixture.worker_handle.await.unwrap();

    let stored = fixture
        .job_repository
        .get_by_id(job.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, JobStatus::Done);

    let filename = stored.filename.unwrap();
    assert!(filename.ends_with(".png"));
    let result = fixture
        .results
        .fetch(&StoragePath::from_raw(filename))
        .await
        .unwrap();
    assert_eq!(result.as_ref(), b"STYLIZED-BYTES");
}

#[tokio::test]
async fn given_stylize_job_when_prediction_fails_then_error_message_is_recorded() {
    let fixture = spawn_worker(
        MockBehavior::Fail("boom".to_string()),
        Duration::from_secs(2),
    );
    let (job, upload_path) = stage_job(&fixture, Preset::Cezanne, b"input-bytes").await;

    fixture
        .sender
        .send(StylizeMessage {
            job_id: job.id,
            preset: Preset::Cezanne,
            upload_path,
            format: ImageFormat::Jpeg,
        })
        .await
        .unwrap();
    drop(fixture.sender);
    fixture.worker_handle.await.unwrap();

    let stored = fixture
        .job_repository
        .get_by_id(job.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, JobStatus::Error);
    assert!(stored.error_message.unwrap().contains("boom"));
    assert!(stored.filename.is_none());
}

#[tokio::test]
async fn given_missing_job_record_when_processed_then_staged_upload_is_still_deleted() {
    let fixture = spawn_worker(MockBehavior::SucceedAfter(0), Duration::from_secs(2));

    // Staged bytes with no matching record; the processing transition fails.
    let job_id = JobId::new();
    let upload_path = StoragePath::for_job(job_id, "jpg");
    fixture
        .uploads
        .store_bytes(&upload_path, Bytes::from_static(b"orphan"))
        .await
        .unwrap();

    fixture
        .sender
        .send(StylizeMessage {
            job_id,
            preset: Preset::Original,
            upload_path: upload_path.clone(),
            format: ImageFormat::Jpeg,
        })
        .await
        .unwrap();
    drop(fixture.sender);
    fixture.worker_handle.await.unwrap();

    assert!(fixture.uploads.fetch(&upload_path).await.is_err());
}

#[tokio::test]
async fn given_shutdown_during_polling_then_job_errors_and_remote_cancelled() {
    let fixture = spawn_worker(MockBehavior::NeverTerminal, Duration::from_secs(30));
    let (job, upload_path) = stage_job(&fixture, Preset::Ukiyoe, b"input-bytes").await;

    fixture
        .sender
        .send(StylizeMessage {
            job_id: job.id,
            preset: Preset::Ukiyoe,
            upload_path,
            format: ImageFormat::Jpeg,
        })
        .await
        .unwrap();

    // Let the worker reach the polling loop, then request shutdown.
    tokio::time::sleep(Duration::from_millis(50)).await;
    fixture.shutdown.cancel();
    drop(fixture.sender);
    fixture.worker_handle.await.unwrap();

    let stored = fixture
        .job_repository
        .get_by_id(job.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, JobStatus::Error);
    assert!(stored.error_message.unwrap().contains("shutting down"));
    assert!(fixture.prediction_client.was_cancelled());
}
