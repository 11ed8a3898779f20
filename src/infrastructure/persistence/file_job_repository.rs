use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;

use crate::application::ports::{JobRepository, RepositoryError};
use crate::domain::{Job, JobId, JobStatus};

/// One JSON file per job, colocated with the result artifacts. Writes are
/// whole-file rewrites with no locking; the last writer wins. Each job has
/// exactly one background task, so the only races are reads during a
/// mid-write and partial writes on a full disk.
pub struct FileJobRepository {
    base_path: PathBuf,
}

impl FileJobRepository {
    pub fn new(base_path: PathBuf) -> Result<Self, RepositoryError> {
        std::fs::create_dir_all(&base_path)
            .map_err(|e| RepositoryError::WriteFailed(e.to_string()))?;
        Ok(Self { base_path })
    }

    fn record_path(&self, id: JobId) -> PathBuf {
        self.base_path.join(format!("{}.json", id.as_uuid()))
    }

    async fn write_record(&self, job: &Job) -> Result<(), RepositoryError> {
        let json = serde_json::to_vec_pretty(job)
            .map_err(|e| RepositoryError::SerializationFailed(e.to_string()))?;
        tokio::fs::write(self.record_path(job.id), json)
            .await
            .map_err(|e| RepositoryError::WriteFailed(e.to_string()))
    }

    async fn read_record(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        let path = self.record_path(id);
        let data = match tokio::fs::read(&path).await {
            Ok(d) => d,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(RepositoryError::ReadFailed(e.to_string())),
        };
        let job = serde_json::from_slice(&data)
            .map_err(|e| RepositoryError::SerializationFailed(e.to_string()))?;
        Ok(Some(job))
    }
}

#[async_trait]
impl JobRepository for FileJobRepository {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError> {
        self.write_record(job).await
    }

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError> {
        self.read_record(id).await
    }

    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        filename: Option<&str>,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut job = self
            .read_record(id)
            .await?
            .ok_or_else(|| RepositoryError::NotFound(id.to_string()))?;

        job.status = status;
        if let Some(f) = filename {
            job.filename = Some(f.to_string());
        }
        if let Some(e) = error_message {
            job.error_message = Some(e.to_string());
        }
        if status.is_terminal() {
            job.finished_at = Some(Utc::now());
        }

        self.write_record(&job).await
    }
}
