use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::categorize::default_categories;
use crate::diff::detect_changes;
use crate::error::AppError;
use crate::extract::extract_products;
use crate::history::{CHANGE_HISTORY_CAP, merge_history};
use crate::models::{Category, ProductRecord, RegionMetadata};
use crate::regions::{self, RegionInfo};
use crate::rules::ClassifierRules;
use crate::traits::{Fetcher, PageParser, PricingStore};

/// Stages of one region's sync, in order. `Failed` is reachable from any
/// stage and is reported through [`SyncOutcome::message`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStage {
    Idle,
    Fetching,
    Extracting,
    Diffing,
    Persisting,
    Done,
    Failed,
}

impl fmt::Display for SyncStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SyncStage::Idle => "idle",
            SyncStage::Fetching => "fetch",
            SyncStage::Extracting => "extraction",
            SyncStage::Diffing => "diffing",
            SyncStage::Persisting => "persistence",
            SyncStage::Done => "done",
            SyncStage::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// The `(success, message, count)` result of one sync operation.
#[derive(Debug, Clone, PartialEq)]
pub struct SyncOutcome {
    pub success: bool,
    pub message: String,
    pub products_count: usize,
}

impl SyncOutcome {
    fn succeeded(message: String, products_count: usize) -> Self {
        Self {
            success: true,
            message,
            products_count,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            success: false,
            message,
            products_count: 0,
        }
    }
}

/// One region's entry in a batch sync report.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionSyncResult {
    pub region: String,
    pub success: bool,
    pub message: String,
    pub products_count: usize,
}

/// Sync status of a configured region, derived from stored metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct RegionStatus {
    pub id: String,
    pub name: String,
    pub site: String,
    pub synced: bool,
    pub last_sync: Option<DateTime<Utc>>,
    pub products_count: usize,
}

/// Sequences category refresh, extraction, diffing, and persistence per
/// region, and fans the sequence out across all configured regions.
///
/// Generic over all external collaborators via traits. Single-threaded per
/// region; single-writer-per-region is assumed, not enforced by the store.
pub struct SyncService<F, P, S>
where
    F: Fetcher,
    P: PageParser,
    S: PricingStore,
{
    fetcher: F,
    parser: P,
    store: S,
    rules: ClassifierRules,
}

impl<F, P, S> SyncService<F, P, S>
where
    F: Fetcher,
    P: PageParser,
    S: PricingStore,
{
    pub fn new(fetcher: F, parser: P, store: S) -> Self {
        Self {
            fetcher,
            parser,
            store,
            rules: ClassifierRules::default(),
        }
    }

    /// Replace the built-in classifier rule tables.
    pub fn with_rules(mut self, rules: ClassifierRules) -> Self {
        self.rules = rules;
        self
    }

    /// Sync pricing for one region.
    ///
    /// With `refresh_categories`, the shared category table is re-scraped
    /// (never fatally) before categorization. Failure of any stage is
    /// reported in the outcome message, naming the stage.
    pub async fn sync_region(&self, region_id: &str, refresh_categories: bool) -> SyncOutcome {
        let Some(region) = regions::find(region_id) else {
            return SyncOutcome::failed(format!("Unknown region: {region_id}"));
        };

        match self.run_region(region, refresh_categories).await {
            Ok(count) => {
                info!(region = region.id, products = count, "sync complete");
                SyncOutcome::succeeded(
                    format!("Synced {count} products for {}", region.name),
                    count,
                )
            }
            Err((stage, error)) => {
                warn!(region = region.id, %stage, %error, "sync failed");
                SyncOutcome::failed(format!("Sync failed during {stage}: {error}"))
            }
        }
    }

    /// Sync all configured regions in registry order.
    ///
    /// The category refresh runs at most once, before the first region, as
    /// an ordering barrier: every region's categorization observes the same
    /// table. One region's failure never aborts the rest.
    pub async fn sync_all(&self) -> Vec<RegionSyncResult> {
        let mut results = Vec::with_capacity(regions::REGIONS.len());
        for (index, region) in regions::REGIONS.iter().enumerate() {
            let outcome = self.sync_region(region.id, index == 0).await;
            results.push(RegionSyncResult {
                region: region.id.to_string(),
                success: outcome.success,
                message: outcome.message,
                products_count: outcome.products_count,
            });
        }
        results
    }

    /// Return existing snapshot info for a region, syncing only when
    /// nothing is stored yet.
    pub async fn ensure_region(&self, region_id: &str) -> SyncOutcome {
        let Some(region) = regions::find(region_id) else {
            return SyncOutcome::failed(format!("Unknown region: {region_id}"));
        };

        match self.store.get_snapshot(region.id).await {
            Ok(existing) if !existing.is_empty() => {
                let last_sync = match self.store.get_metadata(region.id).await {
                    Ok(Some(metadata)) => metadata.last_sync.to_rfc3339(),
                    _ => "unknown".to_string(),
                };
                SyncOutcome::succeeded(
                    format!(
                        "Loaded {} products for {} (last sync: {last_sync})",
                        existing.len(),
                        region.name
                    ),
                    existing.len(),
                )
            }
            _ => self.sync_region(region_id, true).await,
        }
    }

    /// Refresh the shared category table from the source navigation,
    /// falling back to the built-in table, and persist the result.
    pub async fn sync_categories(&self) -> SyncOutcome {
        let categories = self.scrape_categories().await;
        match self.store.set_categories(&categories).await {
            Ok(()) => SyncOutcome::succeeded(
                format!("Synced {} categories", categories.len()),
                categories.len(),
            ),
            Err(error) => SyncOutcome::failed(format!("Failed to persist categories: {error}")),
        }
    }

    /// Per-region sync status derived from stored metadata.
    pub async fn regions_status(&self) -> Vec<RegionStatus> {
        let mut statuses = Vec::with_capacity(regions::REGIONS.len());
        for region in regions::REGIONS {
            let metadata = self.store.get_metadata(region.id).await.ok().flatten();
            statuses.push(RegionStatus {
                id: region.id.to_string(),
                name: region.name.to_string(),
                site: region.site.to_string(),
                synced: metadata.is_some(),
                last_sync: metadata.as_ref().map(|m| m.last_sync),
                products_count: metadata.map(|m| m.products_count).unwrap_or(0),
            });
        }
        statuses
    }

    async fn run_region(
        &self,
        region: &RegionInfo,
        refresh_categories: bool,
    ) -> Result<usize, (SyncStage, AppError)> {
        let categories = self.load_categories(refresh_categories).await;

        let mut stage = SyncStage::Fetching;
        let html = self
            .fetcher
            .fetch_listing(region.site)
            .await
            .map_err(|e| (stage, e))?;

        stage = SyncStage::Extracting;
        let tables = self.parser.parse_price_tables(&html).map_err(|e| (stage, e))?;
        let products = extract_products(&tables, region.id, &categories, &self.rules);
        if products.is_empty() {
            return Err((stage, AppError::ExtractError("no pricing rows found".into())));
        }
        log_category_distribution(region.id, &products);

        stage = SyncStage::Diffing;
        let previous = self
            .store
            .get_snapshot(region.id)
            .await
            .map_err(|e| (stage, e))?;
        let now = Utc::now();
        let changes = detect_changes(&previous, &products, region.id, now);

        // History first, then snapshot and metadata. The window between
        // these writes is a documented inconsistency, not guarded by a
        // transaction.
        stage = SyncStage::Persisting;
        if !changes.is_empty() {
            info!(
                region = region.id,
                changes = changes.len(),
                "detected pricing changes"
            );
            let existing = self.store.get_changes().await.map_err(|e| (stage, e))?;
            let merged = merge_history(existing, changes, CHANGE_HISTORY_CAP);
            self.store
                .set_changes(&merged)
                .await
                .map_err(|e| (stage, e))?;
        }

        let metadata = RegionMetadata {
            region: region.id.to_string(),
            region_name: region.name.to_string(),
            site: region.site.to_string(),
            last_sync: now,
            products_count: products.len(),
            source_url: self.fetcher.listing_url(region.site),
        };
        self.store
            .set_snapshot(region.id, &products)
            .await
            .map_err(|e| (stage, e))?;
        self.store
            .set_metadata(region.id, &metadata)
            .await
            .map_err(|e| (stage, e))?;

        stage = SyncStage::Done;
        debug!(region = region.id, %stage, "region sync finished");
        Ok(products.len())
    }

    /// The category table used for this run: optionally refreshed, else the
    /// stored table, else freshly scraped (and persisted best-effort).
    ///
    /// Infallible; every failure path degrades to the built-in defaults.
    async fn load_categories(&self, refresh: bool) -> Vec<Category> {
        if refresh {
            let outcome = self.sync_categories().await;
            if !outcome.success {
                warn!(reason = %outcome.message, "category refresh failed");
            }
        }

        match self.store.get_categories().await {
            Ok(categories) if !categories.is_empty() => return categories,
            Ok(_) => {}
            Err(error) => warn!(%error, "failed to read stored categories"),
        }

        let categories = self.scrape_categories().await;
        if let Err(error) = self.store.set_categories(&categories).await {
            warn!(%error, "failed to persist categories");
        }
        categories
    }

    /// Scrape category groups from the source navigation; any failure or an
    /// empty result falls back to the built-in table.
    async fn scrape_categories(&self) -> Vec<Category> {
        let parsed = match self.fetcher.fetch_category_page().await {
            Ok(html) => self.parser.parse_category_nav(&html),
            Err(error) => Err(error),
        };
        match parsed {
            Ok(categories) if !categories.is_empty() => {
                info!(count = categories.len(), "scraped categories from pricing page");
                categories
            }
            Ok(_) => {
                info!("category navigation yielded nothing, using default table");
                default_categories()
            }
            Err(error) => {
                warn!(%error, "category scrape failed, using default table");
                default_categories()
            }
        }
    }
}

fn log_category_distribution(region: &str, products: &[ProductRecord]) {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for product in products {
        *counts.entry(product.category.as_str()).or_default() += 1;
    }
    debug!(region, ?counts, "category distribution");
}
