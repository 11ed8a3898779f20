mod image_format;
mod job;
mod job_status;
mod preset;
mod storage_path;

pub use image_format::ImageFormat;
pub use job::{Job, JobId};
pub use job_status::JobStatus;
pub use preset::{Preset, PresetParams};
pub use storage_path::StoragePath;
