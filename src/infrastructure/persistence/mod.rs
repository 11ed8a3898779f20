mod file_job_repository;
mod memory_job_repository;

pub use file_job_repository::FileJobRepository;
pub use memory_job_repository::MemoryJobRepository;
