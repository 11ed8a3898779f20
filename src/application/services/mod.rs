mod stylize_worker;

pub use stylize_worker::{StylizeError, StylizeMessage, StylizeWorker, WorkerSettings};
