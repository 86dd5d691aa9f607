pub mod generations;
pub mod health;
pub mod metrics;
pub mod upload;

pub use generations::{check_generation_status, submit_generation};
pub use health::health_check;
pub use self::metrics::metrics;
pub use upload::upload_image;
