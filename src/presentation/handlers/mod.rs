mod health;
mod impression;
mod job_status;
mod result;

pub use health::{health_handler, root_handler};
pub use impression::impression_handler;
pub use job_status::job_status_handler;
pub use result::result_handler;
