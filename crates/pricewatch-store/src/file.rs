use std::path::{Path, PathBuf};

use pricewatch_core::error::AppError;
use pricewatch_core::models::{Category, ChangeRecord, ProductRecord, RegionMetadata};
use pricewatch_core::traits::PricingStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::fs;

/// Durable file backend.
///
/// One pretty-printed JSON document per key under the data directory:
/// `pricing-{region}.json`, `metadata-{region}.json`, `categories.json`,
/// `changes.json`. The directory is created on first write. Writes replace
/// whole files; the snapshot and metadata writes are not coupled.
#[derive(Debug, Clone)]
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn pricing_file(&self, region: &str) -> PathBuf {
        self.data_dir.join(format!("pricing-{region}.json"))
    }

    fn metadata_file(&self, region: &str) -> PathBuf {
        self.data_dir.join(format!("metadata-{region}.json"))
    }

    fn categories_file(&self) -> PathBuf {
        self.data_dir.join("categories.json")
    }

    fn changes_file(&self) -> PathBuf {
        self.data_dir.join("changes.json")
    }

    async fn read_json<T: DeserializeOwned>(&self, path: &Path) -> Result<Option<T>, AppError> {
        let bytes = match fs::read(path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::StorageError(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )));
            }
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn write_json<T: Serialize + ?Sized>(
        &self,
        path: &Path,
        value: &T,
    ) -> Result<(), AppError> {
        fs::create_dir_all(&self.data_dir).await.map_err(|e| {
            AppError::StorageError(format!(
                "Failed to create {}: {e}",
                self.data_dir.display()
            ))
        })?;
        let bytes = serde_json::to_vec_pretty(value)?;
        fs::write(path, bytes).await.map_err(|e| {
            AppError::StorageError(format!("Failed to write {}: {e}", path.display()))
        })
    }
}

impl PricingStore for FileStore {
    async fn get_snapshot(&self, region: &str) -> Result<Vec<ProductRecord>, AppError> {
        Ok(self
            .read_json(&self.pricing_file(region))
            .await?
            .unwrap_or_default())
    }

    async fn set_snapshot(
        &self,
        region: &str,
        snapshot: &[ProductRecord],
    ) -> Result<(), AppError> {
        self.write_json(&self.pricing_file(region), snapshot).await
    }

    async fn get_metadata(&self, region: &str) -> Result<Option<RegionMetadata>, AppError> {
        self.read_json(&self.metadata_file(region)).await
    }

    async fn set_metadata(
        &self,
        region: &str,
        metadata: &RegionMetadata,
    ) -> Result<(), AppError> {
        self.write_json(&self.metadata_file(region), metadata).await
    }

    async fn get_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self
            .read_json(&self.categories_file())
            .await?
            .unwrap_or_default())
    }

    async fn set_categories(&self, categories: &[Category]) -> Result<(), AppError> {
        self.write_json(&self.categories_file(), categories).await
    }

    async fn get_changes(&self) -> Result<Vec<ChangeRecord>, AppError> {
        // An unreadable history never fails a sync; it restarts empty.
        match self.read_json(&self.changes_file()).await {
            Ok(changes) => Ok(changes.unwrap_or_default()),
            Err(error) => {
                tracing::warn!(%error, "change history unreadable, starting fresh");
                Ok(Vec::new())
            }
        }
    }

    async fn set_changes(&self, changes: &[ChangeRecord]) -> Result<(), AppError> {
        self.write_json(&self.changes_file(), changes).await
    }
}
