use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::ports::{BlobStore, JobRepository};
use crate::application::services::StylizeMessage;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub job_repository: Arc<dyn JobRepository>,
    pub uploads: Arc<dyn BlobStore>,
    pub results: Arc<dyn BlobStore>,
    pub stylize_sender: mpsc::Sender<StylizeMessage>,
    pub settings: Settings,
}
