use impresso::application::ports::JobRepository;
use impresso::domain::{Job, JobId, JobStatus};
use impresso::infrastructure::persistence::FileJobRepository;

fn create_test_repo() -> (tempfile::TempDir, FileJobRepository) {
    let dir = tempfile::TempDir::new().unwrap();
    let repo = FileJobRepository::new(dir.path().to_path_buf()).unwrap();
    (dir, repo)
}

#[tokio::test]
async fn given_created_job_when_fetching_then_record_round_trips() {
    let (_dir, repo) = create_test_repo();
    let job = Job::new("VanGogh".to_string());

    repo.create(&job).await.unwrap();

    let stored = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.id, job.id);
    assert_eq!(stored.status, JobStatus::Queued);
    assert_eq!(stored.preset, "VanGogh");
}

#[tokio::test]
async fn given_created_job_then_one_json_file_per_job_exists() {
    let (dir, repo) = create_test_repo();
    let job = Job::new("Original".to_string());
    repo.create(&job).await.unwrap();

    let record = dir.path().join(format!("{}.json", job.id.as_uuid()));
    assert!(record.exists());
}

#[tokio::test]
async fn given_error_transition_when_updating_then_message_is_persisted() {
    let (_dir, repo) = create_test_repo();
    let job = Job::new("Ukiyoe".to_string());
    repo.create(&job).await.unwrap();

    repo.update_status(job.id, JobStatus::Error, None, Some("prediction failed"))
        .await
        .unwrap();

    let stored = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Error);
    assert_eq!(stored.error_message.as_deref(), Some("prediction failed"));
    assert!(stored.finished_at.is_some());
}

#[tokio::test]
async fn given_unknown_id_when_fetching_then_returns_none() {
    let (_dir, repo) = create_test_repo();

    let result = repo.get_by_id(JobId::new()).await.unwrap();
    assert!(result.is_none());
}

#[tokio::test]
async fn given_unknown_id_when_updating_then_returns_not_found() {
    let (_dir, repo) = create_test_repo();

    let result = repo
        .update_status(JobId::new(), JobStatus::Done, Some("x.png"), None)
        .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn given_restarted_repository_when_fetching_then_records_survive() {
    let dir = tempfile::TempDir::new().unwrap();
    let job = Job::new("Monet".to_string());

    {
        let repo = FileJobRepository::new(dir.path().to_path_buf()).unwrap();
        repo.create(&job).await.unwrap();
        repo.update_status(job.id, JobStatus::Done, Some("out.png"), None)
            .await
            .unwrap();
    }

    let repo = FileJobRepository::new(dir.path().to_path_buf()).unwrap();
    let stored = repo.get_by_id(job.id).await.unwrap().unwrap();
    assert_eq!(stored.status, JobStatus::Done);
    assert_eq!(stored.filename.as_deref(), Some("out.png"));
}
