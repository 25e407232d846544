mod error;
mod handle;
mod traits;

pub mod filesystem;

pub use error::StorageError;
pub use handle::UploadHandle;
pub use traits::{BoxReader, UploadStore};
