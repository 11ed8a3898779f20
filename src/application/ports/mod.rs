mod blob_store;
mod job_repository;
mod prediction_client;
mod repository_error;

pub use blob_store::{BlobStore, BlobStoreError};
pub use job_repository::JobRepository;
pub use prediction_client::{
    Prediction, PredictionClient, PredictionError, PredictionRequest, PredictionStatus,
};
pub use repository_error::RepositoryError;
