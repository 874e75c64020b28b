pub mod types;

pub use types::{AppError, CaptureError, IngestError, StorageError};
