use async_trait::async_trait;

use crate::domain::{Job, JobId, JobStatus};

use super::RepositoryError;

/// Storage seam for job records. Backends are swappable: process memory,
/// one JSON file per job, or a real database later.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn create(&self, job: &Job) -> Result<(), RepositoryError>;

    async fn get_by_id(&self, id: JobId) -> Result<Option<Job>, RepositoryError>;

    /// Applies a status transition. Terminal transitions set `finished_at`
    /// and, when present, the result filename or error message.
    async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        filename: Option<&str>,
        error_message: Option<&str>,
    ) -> Result<(), RepositoryError>;
}
