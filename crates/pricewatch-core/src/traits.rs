use std::future::Future;

use crate::error::AppError;
use crate::models::{Category, ChangeRecord, ProductRecord, RawTable, RegionMetadata};

/// Fetches raw listing markup from the source site.
///
/// Owns URLs, User-Agent, timeout, and any retry policy; the core never
/// retries on its own.
pub trait Fetcher: Send + Sync + Clone {
    /// Fetch the pricing listing page for one region's site code.
    fn fetch_listing(&self, site: &str) -> impl Future<Output = Result<String, AppError>> + Send;

    /// Fetch the main pricing page whose navigation carries category data.
    fn fetch_category_page(&self) -> impl Future<Output = Result<String, AppError>> + Send;

    /// The listing URL for a site code, recorded in region metadata.
    fn listing_url(&self, site: &str) -> String;
}

/// Turns raw markup into tables and category groups.
///
/// Pure HTML mechanics; extraction semantics live in [`crate::extract`].
pub trait PageParser: Send + Sync + Clone {
    fn parse_price_tables(&self, html: &str) -> Result<Vec<RawTable>, AppError>;

    fn parse_category_nav(&self, html: &str) -> Result<Vec<Category>, AppError>;
}

/// Persists snapshots, metadata, categories, and the change history.
///
/// Backend-agnostic: implementations are a volatile key-value map or a
/// durable file tree, chosen once at configuration time. Every `set_*` is a
/// full replacement of the prior value; there is no transactional coupling
/// between the snapshot write and the metadata write.
pub trait PricingStore: Send + Sync + Clone {
    /// The stored snapshot for a region; empty if never synced.
    fn get_snapshot(
        &self,
        region: &str,
    ) -> impl Future<Output = Result<Vec<ProductRecord>, AppError>> + Send;

    fn set_snapshot(
        &self,
        region: &str,
        snapshot: &[ProductRecord],
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn get_metadata(
        &self,
        region: &str,
    ) -> impl Future<Output = Result<Option<RegionMetadata>, AppError>> + Send;

    fn set_metadata(
        &self,
        region: &str,
        metadata: &RegionMetadata,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// The shared, region-independent category table; empty if never saved.
    fn get_categories(&self) -> impl Future<Output = Result<Vec<Category>, AppError>> + Send;

    fn set_categories(
        &self,
        categories: &[Category],
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// The shared change history, oldest first; empty if never written.
    fn get_changes(&self) -> impl Future<Output = Result<Vec<ChangeRecord>, AppError>> + Send;

    fn set_changes(
        &self,
        changes: &[ChangeRecord],
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}
