pub mod luma;
pub mod metrics;
pub mod storage;

pub use luma::{LumaClient, LumaError};
pub use self::metrics::{get_metrics, init_metrics};
pub use storage::{CloudinaryStore, ObjectStore, StoreError, StoredObject, UploadMetadata};
