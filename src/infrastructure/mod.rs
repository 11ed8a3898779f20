pub mod observability;
pub mod persistence;
pub mod prediction;
pub mod storage;
