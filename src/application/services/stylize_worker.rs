use std::sync::Arc;
use std::time::Duration;

use base64::{Engine as _, engine::general_purpose};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::application::ports::{
    BlobStore, JobRepository, PredictionClient, PredictionRequest, PredictionStatus,
};
use crate::domain::{ImageFormat, JobId, JobStatus, Preset, StoragePath};

/// One unit of work, pushed by the intake handler and consumed by the
/// worker loop.
pub struct StylizeMessage {
    pub job_id: JobId,
    pub preset: Preset,
    pub upload_path: StoragePath,
    pub format: ImageFormat,
}

#[derive(Debug, Clone)]
pub struct WorkerSettings {
    /// Model version identifier submitted with each prediction.
    pub model_version: String,
    pub poll_interval: Duration,
    /// Wall-clock budget for one external prediction, submit to terminal.
    pub poll_timeout: Duration,
}

/// Consumes stylize messages and drives each job through
/// `queued → processing → done | error`.
pub struct StylizeWorker<P> {
    receiver: mpsc::Receiver<StylizeMessage>,
    uploads: Arc<dyn BlobStore>,
    results: Arc<dyn BlobStore>,
    prediction_client: Arc<P>,
    job_repository: Arc<dyn JobRepository>,
    settings: WorkerSettings,
    shutdown: CancellationToken,
}

impl<P> StylizeWorker<P>
where
    P: PredictionClient + 'static,
{
    pub fn new(
        receiver: mpsc::Receiver<StylizeMessage>,
        uploads: Arc<dyn BlobStore>,
        results: Arc<dyn BlobStore>,
        prediction_client: Arc<P>,
        job_repository: Arc<dyn JobRepository>,
        settings: WorkerSettings,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            receiver,
            uploads,
            results,
            prediction_client,
            job_repository,
            settings,
            shutdown,
        }
    }

    pub async fn run(mut self) {
        tracing::info!("Stylize worker started");
        loop {
            let msg = tokio::select! {
                msg = self.receiver.recv() => match msg {
                    Some(m) => m,
                    None => break,
                },
                _ = self.shutdown.cancelled() => break,
            };

            let span = tracing::info_span!(
                "stylize_job",
                job_id = %msg.job_id,
                preset = msg.preset.name(),
            );

            if let Err(e) = self.process_job(msg).instrument(span).await {
                tracing::error!(error = %e, "Stylize job failed");
            }
        }
        tracing::info!("Stylize worker stopped");
    }

    async fn process_job(&self, msg: StylizeMessage) -> Result<(), StylizeError> {
        let job_id = msg.job_id;

        let result = match self
            .job_repository
            .update_status(job_id, JobStatus::Processing, None, None)
            .await
        {
            Ok(()) => self.process_pipeline(&msg).await,
            Err(e) => Err(StylizeError::Repository(e)),
        };

        // The staged upload is removed after the terminal transition either
        // way; a failed delete only leaves garbage behind.
        if let Err(e) = self.uploads.delete(&msg.upload_path).await {
            tracing::warn!(
                error = %e,
                path = %msg.upload_path,
                "Failed to delete staged upload"
            );
        }

        match result {
            Ok(filename) => {
                self.job_repository
                    .update_status(job_id, JobStatus::Done, Some(&filename), None)
                    .await
                    .map_err(StylizeError::Repository)?;
                tracing::info!(filename = %filename, "Stylization completed");
                Ok(())
            }
            Err(e) => {
                let error_msg = e.to_string();
                self.job_repository
                    .update_status(job_id, JobStatus::Error, None, Some(&error_msg))
                    .await
                    .map_err(StylizeError::Repository)?;
                Err(e)
            }
        }
    }

    /// Produces the result artifact and returns its filename.
    async fn process_pipeline(&self, msg: &StylizeMessage) -> Result<String, StylizeError> {
        let data = self
            .uploads
            .fetch(&msg.upload_path)
            .await
            .map_err(StylizeError::Staging)?;

        if msg.preset.is_pass_through() {
            let result_path = StoragePath::for_job(msg.job_id, msg.format.extension());
            self.results
                .store_bytes(&result_path, data)
                .await
                .map_err(StylizeError::Results)?;
            return Ok(result_path.as_str().to_string());
        }

        let params = msg
            .preset
            .params()
            .ok_or_else(|| StylizeError::InvalidPreset(msg.preset.name()))?;

        let image_uri = format!(
            "data:{};base64,{}",
            msg.format.as_mime(),
            general_purpose::STANDARD.encode(&data)
        );
        let request = PredictionRequest {
            version: self.settings.model_version.clone(),
            image: image_uri,
            style_weights: params.style_weights.to_string(),
            scale: params.scale,
            prompt: params.prompt.to_string(),
        };

        let created = self
            .prediction_client
            .create(&request)
            .await
            .map_err(StylizeError::Prediction)?;
        tracing::debug!(prediction_id = %created.id, "Prediction submitted");

        let prediction = self.poll_until_terminal(&created.id).await?;

        let output_url = prediction
            .first_output()
            .ok_or(StylizeError::MissingOutput)?;

        let extension = ImageFormat::from_filename(output_url)
            .unwrap_or(ImageFormat::Png)
            .extension();
        let artifact = self
            .prediction_client
            .download(output_url)
            .await
            .map_err(StylizeError::Prediction)?;

        let result_path = StoragePath::for_job(msg.job_id, extension);
        self.results
            .store_bytes(&result_path, artifact)
            .await
            .map_err(StylizeError::Results)?;

        Ok(result_path.as_str().to_string())
    }

    /// Polls the prediction at a fixed interval until it reaches a terminal
    /// status, the wall-clock budget elapses, or shutdown is requested. On
    /// timeout or shutdown the remote prediction is cancelled best-effort.
    async fn poll_until_terminal(
        &self,
        prediction_id: &str,
    ) -> Result<crate::application::ports::Prediction, StylizeError> {
        let poll_future = async {
            loop {
                let prediction = self
                    .prediction_client
                    .get(prediction_id)
                    .await
                    .map_err(StylizeError::Prediction)?;

                match prediction.status {
                    PredictionStatus::Succeeded => return Ok(prediction),
                    PredictionStatus::Failed | PredictionStatus::Canceled => {
                        let reason = prediction.error.clone().unwrap_or_else(|| {
                            format!("prediction {}", prediction.status.as_str())
                        });
                        return Err(StylizeError::PredictionFailed(reason));
                    }
                    PredictionStatus::Starting | PredictionStatus::Processing => {
                        tokio::time::sleep(self.settings.poll_interval).await;
                    }
                }
            }
        };

        tokio::select! {
            result = tokio::time::timeout(self.settings.poll_timeout, poll_future) => {
                match result {
                    Ok(r) => r,
                    Err(_) => {
                        self.abandon(prediction_id).await;
                        Err(StylizeError::Timeout(self.settings.poll_timeout.as_secs()))
                    }
                }
            }
            _ = self.shutdown.cancelled() => {
                self.abandon(prediction_id).await;
                Err(StylizeError::Shutdown)
            }
        }
    }

    async fn abandon(&self, prediction_id: &str) {
        if let Err(e) = self.prediction_client.cancel(prediction_id).await {
            tracing::warn!(
                error = %e,
                prediction_id = %prediction_id,
                "Failed to cancel remote prediction"
            );
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StylizeError {
    #[error("staged upload: {0}")]
    Staging(crate::application::ports::BlobStoreError),
    #[error("result store: {0}")]
    Results(crate::application::ports::BlobStoreError),
    #[error("prediction api: {0}")]
    Prediction(crate::application::ports::PredictionError),
    #[error("{0}")]
    PredictionFailed(String),
    #[error("prediction returned no output")]
    MissingOutput,
    #[error("stylization timed out after {0}s")]
    Timeout(u64),
    #[error("service shutting down")]
    Shutdown,
    #[error("preset {0} has no model parameters")]
    InvalidPreset(&'static str),
    #[error("repository: {0}")]
    Repository(crate::application::ports::RepositoryError),
}
