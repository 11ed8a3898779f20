use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Input for one create-prediction call against the external API.
#[derive(Debug, Clone, Serialize)]
pub struct PredictionRequest {
    /// Model version identifier pinned in configuration.
    pub version: String,
    /// Uploaded image as a base64 data URI.
    pub image: String,
    pub style_weights: String,
    pub scale: f32,
    pub prompt: String,
}

/// The external API's view of one asynchronous transform invocation.
#[derive(Debug, Clone, Deserialize)]
pub struct Prediction {
    pub id: String,
    pub status: PredictionStatus,
    pub output: Option<Vec<String>>,
    pub error: Option<String>,
}

impl Prediction {
    pub fn first_output(&self) -> Option<&str> {
        self.output
            .as_deref()
            .and_then(|urls| urls.first())
            .map(String::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PredictionStatus::Starting => "starting",
            PredictionStatus::Processing => "processing",
            PredictionStatus::Succeeded => "succeeded",
            PredictionStatus::Failed => "failed",
            PredictionStatus::Canceled => "canceled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PredictionStatus::Succeeded | PredictionStatus::Failed | PredictionStatus::Canceled
        )
    }
}

/// Client seam for the third-party prediction API: create, poll by id,
/// best-effort cancel, and bare-URL artifact download.
#[async_trait]
pub trait PredictionClient: Send + Sync {
    async fn create(&self, request: &PredictionRequest) -> Result<Prediction, PredictionError>;

    async fn get(&self, id: &str) -> Result<Prediction, PredictionError>;

    async fn cancel(&self, id: &str) -> Result<(), PredictionError>;

    async fn download(&self, url: &str) -> Result<Bytes, PredictionError>;
}

#[derive(Debug, thiserror::Error)]
pub enum PredictionError {
    #[error("api request failed: {0}")]
    ApiRequestFailed(String),
    #[error("invalid response: {0}")]
    InvalidResponse(String),
    #[error("download failed: {0}")]
    DownloadFailed(String),
}
