//! End-to-end pipeline tests: stub fetcher -> real HTML parser -> extraction
//! -> change detection -> memory store.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use pricewatch_client::HtmlPageParser;
use pricewatch_core::error::AppError;
use pricewatch_core::models::{Change, PriceField};
use pricewatch_core::sync::SyncService;
use pricewatch_core::traits::{Fetcher, PricingStore};
use pricewatch_store::MemoryStore;

#[derive(Clone, Default)]
struct StubFetcher {
    pages: HashMap<String, String>,
    category_page: Option<String>,
    category_fetches: Arc<AtomicUsize>,
}

impl StubFetcher {
    fn with_page(site: &str, html: String) -> Self {
        let mut fetcher = Self::default();
        fetcher.pages.insert(site.to_string(), html);
        fetcher
    }
}

impl Fetcher for StubFetcher {
    async fn fetch_listing(&self, site: &str) -> Result<String, AppError> {
        self.pages
            .get(site)
            .cloned()
            .ok_or_else(|| AppError::HttpError(format!("HTTP 404 for {}", self.listing_url(site))))
    }

    async fn fetch_category_page(&self) -> Result<String, AppError> {
        self.category_fetches.fetch_add(1, Ordering::SeqCst);
        self.category_page
            .clone()
            .ok_or_else(|| AppError::HttpError("HTTP 404 for stub://pricing/".to_string()))
    }

    fn listing_url(&self, site: &str) -> String {
        format!("stub://pricing/list/?site={site}")
    }
}

fn listing_html(rows: &[(&str, &str, &str, &str, &str)]) -> String {
    let mut table = String::from(
        "<table><tr><th>Product</th><th>Billing Unit</th>\
         <th>Billed Annually</th><th>Billed Month-to-Month</th><th>On-Demand</th></tr>",
    );
    for (name, unit, annually, monthly, on_demand) in rows {
        table.push_str(&format!(
            "<tr><td>{name}</td><td>{unit}</td><td>{annually}</td>\
             <td>{monthly}</td><td>{on_demand}</td></tr>"
        ));
    }
    table.push_str("</table>");
    format!("<html><body>{table}</body></html>")
}

fn service(
    fetcher: StubFetcher,
    store: MemoryStore,
) -> SyncService<StubFetcher, HtmlPageParser, MemoryStore> {
    SyncService::new(fetcher, HtmlPageParser::new().unwrap(), store)
}

#[tokio::test]
async fn first_sync_records_additions_then_resync_is_idempotent() {
    let html = listing_html(&[
        ("Infrastructure Pro", "per host", "$15", "$18", ""),
        ("Custom Metrics", "per 100 metrics", "$5", "", "$0.05"),
    ]);
    let store = MemoryStore::new();
    let svc = service(StubFetcher::with_page("us", html), store.clone());

    let outcome = svc.sync_region("us", false).await;
    assert!(outcome.success, "{}", outcome.message);
    assert_eq!(outcome.products_count, 2);

    let changes = store.get_changes().await.unwrap();
    assert_eq!(changes.len(), 2);
    assert!(
        changes
            .iter()
            .all(|c| matches!(c.change, Change::ProductAdded { .. }))
    );

    // Same markup again: no new events, snapshot and metadata refreshed.
    let outcome = svc.sync_region("us", false).await;
    assert!(outcome.success);
    assert_eq!(store.get_changes().await.unwrap().len(), 2);

    let metadata = store.get_metadata("us").await.unwrap().unwrap();
    assert_eq!(metadata.products_count, 2);
    assert_eq!(metadata.source_url, "stub://pricing/list/?site=us");
}

#[tokio::test]
async fn price_change_emits_single_field_event() {
    let store = MemoryStore::new();
    let before = listing_html(&[("Infrastructure Pro", "per host", "$15", "$18", "")]);
    let after = listing_html(&[("Infrastructure Pro", "per host", "$18", "$18", "")]);

    let first = service(StubFetcher::with_page("us", before), store.clone());
    assert!(first.sync_region("us", false).await.success);
    let second = service(StubFetcher::with_page("us", after), store.clone());
    assert!(second.sync_region("us", false).await.success);

    let changes = store.get_changes().await.unwrap();
    // One addition from the first sync, exactly one price change after.
    assert_eq!(changes.len(), 2);
    match &changes[1].change {
        Change::PriceChange {
            field,
            old_value,
            new_value,
        } => {
            assert_eq!(*field, PriceField::BilledAnnually);
            assert_eq!(old_value.as_deref(), Some("$15"));
            assert_eq!(new_value.as_deref(), Some("$18"));
        }
        other => panic!("expected a price change, got {other:?}"),
    }
}

#[tokio::test]
async fn added_and_removed_products_are_reported() {
    let store = MemoryStore::new();
    let before = listing_html(&[("Infrastructure Pro", "per host", "$15", "$18", "")]);
    let after = listing_html(&[("Log Management", "per GB", "$0.10", "", "")]);

    let first = service(StubFetcher::with_page("us", before), store.clone());
    assert!(first.sync_region("us", false).await.success);
    let second = service(StubFetcher::with_page("us", after), store.clone());
    assert!(second.sync_region("us", false).await.success);

    let changes = store.get_changes().await.unwrap();
    assert_eq!(changes.len(), 3);

    let added: Vec<_> = changes
        .iter()
        .filter(|c| matches!(c.change, Change::ProductAdded { .. }))
        .map(|c| c.product.as_str())
        .collect();
    assert_eq!(added, vec!["Infrastructure Pro", "Log Management"]);

    let removed = changes
        .iter()
        .find(|c| matches!(c.change, Change::ProductRemoved { .. }))
        .expect("removal event");
    assert_eq!(removed.product, "Infrastructure Pro");
    match &removed.change {
        Change::ProductRemoved { data } => {
            assert_eq!(data.billed_annually.as_deref(), Some("$15"));
            assert_eq!(data.billed_month_to_month.as_deref(), Some("$18"));
            assert_eq!(data.on_demand, None);
        }
        other => panic!("expected a removal, got {other:?}"),
    }

    // The removed product is absent from the replaced snapshot.
    let snapshot = store.get_snapshot("us").await.unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].product, "Log Management");
}

#[tokio::test]
async fn batch_sync_continues_past_failing_regions() {
    let html = listing_html(&[("Infrastructure Pro", "per host", "$15", "$18", "")]);
    let store = MemoryStore::new();
    let fetcher = StubFetcher::with_page("us", html);
    let category_fetches = fetcher.category_fetches.clone();
    let svc = service(fetcher, store.clone());

    let results = svc.sync_all().await;
    assert_eq!(results.len(), 5);
    assert!(results[0].success, "{}", results[0].message);
    for result in &results[1..] {
        assert!(!result.success);
        assert!(result.message.contains("fetch"), "{}", result.message);
    }

    // The shared category refresh ran exactly once, for the first region.
    assert_eq!(category_fetches.load(Ordering::SeqCst), 1);

    // The failing regions left no snapshot behind.
    assert_eq!(store.get_snapshot("us").await.unwrap().len(), 1);
    assert!(store.get_snapshot("eu1").await.unwrap().is_empty());
}

#[tokio::test]
async fn scraped_categories_shape_product_categorization() {
    let listing = listing_html(&[("Widget Monitoring", "per widget", "$9", "", "")]);
    let nav = r#"
        <html><body>
          <div class="pricing-sidebar">
            <h3>Widgets</h3>
            <ul><li><a href="/w">Widget Monitoring</a></li></ul>
          </div>
        </body></html>"#;

    let store = MemoryStore::new();
    let mut fetcher = StubFetcher::with_page("us", listing);
    fetcher.category_page = Some(nav.to_string());
    let svc = service(fetcher, store.clone());

    assert!(svc.sync_region("us", true).await.success);

    let snapshot = store.get_snapshot("us").await.unwrap();
    assert_eq!(snapshot[0].category, "Widgets");

    let categories = store.get_categories().await.unwrap();
    assert_eq!(categories.len(), 1);
    assert_eq!(categories[0].products, vec!["Widget Monitoring"]);
}

#[tokio::test]
async fn failed_category_scrape_falls_back_to_default_table() {
    let listing = listing_html(&[("Custom Metrics", "per 100 metrics", "$5", "", "")]);
    let store = MemoryStore::new();
    // No category page: the refresh degrades to the built-in table.
    let svc = service(StubFetcher::with_page("us", listing), store.clone());

    assert!(svc.sync_region("us", true).await.success);

    let snapshot = store.get_snapshot("us").await.unwrap();
    assert_eq!(snapshot[0].category, "Infrastructure");
    assert_eq!(store.get_categories().await.unwrap().len(), 8);
}

#[tokio::test]
async fn history_is_shared_across_regions_and_filterable() {
    let store = MemoryStore::new();
    let mut fetcher = StubFetcher::default();
    fetcher.pages.insert(
        "us".into(),
        listing_html(&[("Infrastructure Pro", "per host", "$15", "", "")]),
    );
    fetcher.pages.insert(
        "eu1".into(),
        listing_html(&[("Infrastructure Pro", "per host", "$17", "", "")]),
    );
    let svc = service(fetcher, store.clone());

    assert!(svc.sync_region("us", false).await.success);
    assert!(svc.sync_region("eu1", false).await.success);

    let changes = store.get_changes().await.unwrap();
    assert_eq!(changes.len(), 2);
    let regions: Vec<_> = changes.iter().map(|c| c.region.as_str()).collect();
    assert_eq!(regions, vec!["us", "eu1"]);
}
