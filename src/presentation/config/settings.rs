use std::time::Duration;

use config::{Config, Environment as EnvironmentSource, File};
use serde::Deserialize;

use super::Environment;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub jobs: JobsSettings,
    pub replicate: ReplicateSettings,
}

impl Settings {
    /// Layered load: `appsettings.{env}` file (optional) overridden by
    /// `APP_`-prefixed environment variables.
    pub fn load(environment: Environment) -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(
                File::with_name(&format!("appsettings.{}", environment.as_str())).required(false),
            )
            .add_source(
                EnvironmentSource::with_prefix("APP")
                    .separator("__")
                    .list_separator(" "),
            )
            .build()?
            .try_deserialize()
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub max_upload_mb: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            max_upload_mb: 12,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Transient staging area for uploads, cleared after processing.
    pub upload_dir: String,
    /// Result artifacts, retained indefinitely.
    pub result_dir: String,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            upload_dir: "data/uploads".to_string(),
            result_dir: "data/results".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JobsSettings {
    pub backend: JobStoreBackend,
    pub queue_capacity: usize,
}

impl Default for JobsSettings {
    fn default() -> Self {
        Self {
            backend: JobStoreBackend::Memory,
            queue_capacity: 64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStoreBackend {
    /// Process-memory map; records are lost on restart.
    Memory,
    /// One JSON file per job, colocated with results.
    File,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReplicateSettings {
    pub base_url: String,
    /// Bearer token for the prediction API. Empty means unconfigured;
    /// stylization requests are then rejected at intake.
    pub token: String,
    pub model_version: String,
    pub poll_interval_ms: u64,
    pub poll_timeout_secs: u64,
}

impl ReplicateSettings {
    pub fn is_configured(&self) -> bool {
        !self.token.is_empty()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn poll_timeout(&self) -> Duration {
        Duration::from_secs(self.poll_timeout_secs)
    }
}

impl Default for ReplicateSettings {
    fn default() -> Self {
        Self {
            base_url: "https://api.replicate.com".to_string(),
            token: String::new(),
            model_version: "a9758cbfbd5f3c2094457d996681af52552901775aa2d6dd0b17fd15df959bef"
                .to_string(),
            poll_interval_ms: 1500,
            poll_timeout_secs: 150,
        }
    }
}
