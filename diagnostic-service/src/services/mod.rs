pub mod providers;
pub mod storage;

pub use storage::{ImageStore, LocalImageStore, StoredImage};
