pub mod config;
pub mod file;
pub mod keys;
pub mod memory;

pub use config::{StorageBackend, StorageConfig};
pub use file::FileStore;
pub use memory::MemoryStore;
