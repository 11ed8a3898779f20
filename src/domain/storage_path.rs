use std::fmt;

use super::JobId;

/// Relative location of a staged upload or result artifact within a blob
/// store. Always a single path segment: a job id plus an extension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePath(String);

impl StoragePath {
    pub fn for_job(job_id: JobId, extension: &str) -> Self {
        Self(format!("{}.{}", job_id.as_uuid(), extension))
    }

    pub fn from_raw(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StoragePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
