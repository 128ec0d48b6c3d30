use std::collections::HashMap;
use std::sync::Arc;

use pricewatch_core::error::AppError;
use pricewatch_core::models::{Category, ChangeRecord, ProductRecord, RegionMetadata};
use pricewatch_core::traits::PricingStore;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;

use crate::keys;

/// Volatile key-value backend.
///
/// Values live in an in-process map as JSON documents and vanish with the
/// process. Clones share the same map, so one store can serve a whole
/// multi-region run.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<HashMap<String, serde_json::Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    async fn get_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, AppError> {
        let map = self.inner.read().await;
        match map.get(key) {
            None => Ok(None),
            Some(value) => Ok(Some(serde_json::from_value(value.clone())?)),
        }
    }

    async fn set_json<T: Serialize>(&self, key: &str, value: &T) -> Result<(), AppError> {
        let json = serde_json::to_value(value)?;
        self.inner.write().await.insert(key.to_string(), json);
        Ok(())
    }
}

impl PricingStore for MemoryStore {
    async fn get_snapshot(&self, region: &str) -> Result<Vec<ProductRecord>, AppError> {
        Ok(self
            .get_json(&keys::pricing(region))
            .await?
            .unwrap_or_default())
    }

    async fn set_snapshot(
        &self,
        region: &str,
        snapshot: &[ProductRecord],
    ) -> Result<(), AppError> {
        self.set_json(&keys::pricing(region), &snapshot).await
    }

    async fn get_metadata(&self, region: &str) -> Result<Option<RegionMetadata>, AppError> {
        self.get_json(&keys::pricing_metadata(region)).await
    }

    async fn set_metadata(
        &self,
        region: &str,
        metadata: &RegionMetadata,
    ) -> Result<(), AppError> {
        self.set_json(&keys::pricing_metadata(region), metadata).await
    }

    async fn get_categories(&self) -> Result<Vec<Category>, AppError> {
        Ok(self.get_json(keys::CATEGORIES).await?.unwrap_or_default())
    }

    async fn set_categories(&self, categories: &[Category]) -> Result<(), AppError> {
        self.set_json(keys::CATEGORIES, &categories).await
    }

    async fn get_changes(&self) -> Result<Vec<ChangeRecord>, AppError> {
        Ok(self.get_json(keys::CHANGES).await?.unwrap_or_default())
    }

    async fn set_changes(&self, changes: &[ChangeRecord]) -> Result<(), AppError> {
        self.set_json(keys::CHANGES, &changes).await
    }
}
