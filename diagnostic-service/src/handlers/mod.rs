pub mod diagnose;
pub mod health;
pub mod static_files;

pub use diagnose::{analyze_image, analyze_job};
pub use health::{health_check, liveness};
pub use static_files::serve_upload;
