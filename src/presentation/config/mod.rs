mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    JobStoreBackend, JobsSettings, ReplicateSettings, ServerSettings, Settings, StorageSettings,
};
