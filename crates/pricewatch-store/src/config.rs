use std::path::PathBuf;

use pricewatch_core::AppError;

/// Which persistence backend a deployment uses.
///
/// Chosen once at configuration time; backends are never mixed within a
/// deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    /// In-process key-value map; contents are lost on exit.
    Memory,
    /// JSON files in a data directory.
    File,
}

/// Storage configuration for pricewatch.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub data_dir: PathBuf,
}

impl StorageConfig {
    /// Read configuration from environment variables.
    ///
    /// - `PRICEWATCH_STORAGE` (optional, `file` or `memory`, defaults to `file`)
    /// - `PRICEWATCH_DATA_DIR` (optional, defaults to `data/pricing`)
    pub fn from_env() -> Result<Self, AppError> {
        let backend = match std::env::var("PRICEWATCH_STORAGE") {
            Err(_) => StorageBackend::File,
            Ok(raw) => match raw.to_lowercase().as_str() {
                "file" => StorageBackend::File,
                "memory" => StorageBackend::Memory,
                other => {
                    return Err(AppError::ConfigError(format!(
                        "Invalid PRICEWATCH_STORAGE '{other}': expected 'file' or 'memory'"
                    )));
                }
            },
        };

        let data_dir = std::env::var("PRICEWATCH_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data/pricing"));

        Ok(Self { backend, data_dir })
    }
}
