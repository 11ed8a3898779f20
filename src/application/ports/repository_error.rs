#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("serialization failed: {0}")]
    SerializationFailed(String),
    #[error("read failed: {0}")]
    ReadFailed(String),
    #[error("write failed: {0}")]
    WriteFailed(String),
    #[error("not found: {0}")]
    NotFound(String),
}
