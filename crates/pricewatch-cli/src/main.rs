use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use pricewatch_client::{FetchConfig, HtmlPageParser, HttpFetcher};
use pricewatch_core::models::Change;
use pricewatch_core::regions;
use pricewatch_core::sync::SyncService;
use pricewatch_core::traits::PricingStore;
use pricewatch_core::util::parse_price;
use pricewatch_store::{FileStore, MemoryStore, StorageBackend, StorageConfig};

#[derive(Parser)]
#[command(name = "pricewatch", version, about = "Pricing listing tracker with change history")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sync pricing for one region, or all configured regions
    Sync {
        /// Region id (e.g. "us", "eu1"); defaults to the primary region
        region: Option<String>,

        /// Sync every configured region in order
        #[arg(long, conflicts_with = "region")]
        all: bool,

        /// Reuse stored categories instead of refreshing them first
        #[arg(long)]
        skip_category_refresh: bool,
    },

    /// Show sync status for all configured regions
    Status,

    /// Refresh the shared product category table
    Categories,

    /// Print the stored snapshot for a region
    Show {
        /// Region id (e.g. "us", "eu1")
        region: String,
    },

    /// Show recent pricing change history
    History {
        /// Only show changes for this region
        #[arg(short, long)]
        region: Option<String>,

        /// Number of records to show, newest last
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Setup tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("pricewatch_core=info".parse()?)
                .add_directive("pricewatch_client=info".parse()?)
                .add_directive("pricewatch_store=info".parse()?),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let storage = StorageConfig::from_env()?;

    match storage.backend {
        StorageBackend::Memory => run(cli.command, MemoryStore::new()).await,
        StorageBackend::File => run(cli.command, FileStore::new(storage.data_dir)).await,
    }
}

async fn run<S: PricingStore>(command: Commands, store: S) -> Result<()> {
    match command {
        Commands::Sync {
            region,
            all,
            skip_category_refresh,
        } => {
            let service = sync_service(store)?;
            if all {
                let results = service.sync_all().await;
                for result in &results {
                    let marker = if result.success { " ok " } else { "FAIL" };
                    println!("[{marker}] {:8} {}", result.region, result.message);
                }
                let failed = results.iter().filter(|r| !r.success).count();
                if failed > 0 {
                    anyhow::bail!("{failed} of {} regions failed to sync", results.len());
                }
            } else {
                let region = region.unwrap_or_else(|| regions::DEFAULT_REGION.to_string());
                let outcome = service.sync_region(&region, !skip_category_refresh).await;
                if !outcome.success {
                    anyhow::bail!(outcome.message);
                }
                println!("{}", outcome.message);
            }
            Ok(())
        }

        Commands::Status => {
            let service = sync_service(store)?;
            for status in service.regions_status().await {
                let last_sync = status
                    .last_sync
                    .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{:8} {:24} products: {:4}  last sync: {last_sync}",
                    status.id, status.name, status.products_count
                );
            }
            Ok(())
        }

        Commands::Categories => {
            let service = sync_service(store)?;
            let outcome = service.sync_categories().await;
            if !outcome.success {
                anyhow::bail!(outcome.message);
            }
            println!("{}", outcome.message);
            Ok(())
        }

        Commands::Show { region } => cmd_show(&region, &store).await,

        Commands::History { region, limit } => {
            cmd_history(region.as_deref(), limit, &store).await
        }
    }
}

/// Wire the live fetcher and parser to a storage backend.
fn sync_service<S: PricingStore>(
    store: S,
) -> Result<SyncService<HttpFetcher, HtmlPageParser, S>> {
    let fetcher = HttpFetcher::with_config(FetchConfig::from_env()?)?;
    let parser = HtmlPageParser::new()?;
    Ok(SyncService::new(fetcher, parser, store))
}

async fn cmd_show<S: PricingStore>(region: &str, store: &S) -> Result<()> {
    let snapshot = store.get_snapshot(region).await?;
    if snapshot.is_empty() {
        println!("No snapshot stored for {region}");
        return Ok(());
    }

    println!(
        "{:<44} {:<26} {:>10} {:>10} {:>10}",
        "Product", "Billing Unit", "Annual", "Monthly", "On-Demand"
    );
    for record in &snapshot {
        println!(
            "{:<44} {:<26} {:>10} {:>10} {:>10}",
            record.product,
            record.billing_unit,
            fmt_price(record.billed_annually.as_deref()),
            fmt_price(record.billed_month_to_month.as_deref()),
            fmt_price(record.on_demand.as_deref()),
        );
    }
    println!("\nTotal: {} products", snapshot.len());
    Ok(())
}

/// Render a raw price cell as a number; absent stays "-".
fn fmt_price(raw: Option<&str>) -> String {
    match raw {
        None => "-".to_string(),
        Some(raw) => format!("{:.2}", parse_price(raw)),
    }
}

async fn cmd_history<S: PricingStore>(
    region: Option<&str>,
    limit: usize,
    store: &S,
) -> Result<()> {
    let changes = store.get_changes().await?;
    let matching: Vec<_> = changes
        .iter()
        .filter(|c| region.is_none_or(|r| c.region == r))
        .collect();

    if matching.is_empty() {
        println!("No changes recorded");
        return Ok(());
    }

    let start = matching.len().saturating_sub(limit);
    for record in &matching[start..] {
        let when = record.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
        match &record.change {
            Change::ProductAdded { .. } => println!(
                "[{when}] {:8} + {} ({})",
                record.region, record.product, record.category
            ),
            Change::ProductRemoved { .. } => println!(
                "[{when}] {:8} - {} ({})",
                record.region, record.product, record.category
            ),
            Change::PriceChange {
                field,
                old_value,
                new_value,
            } => println!(
                "[{when}] {:8} ~ {}: {} {} -> {}",
                record.region,
                record.product,
                field.as_str(),
                old_value.as_deref().unwrap_or("-"),
                new_value.as_deref().unwrap_or("-"),
            ),
        }
    }
    println!(
        "\nShowing {} of {} records",
        matching.len() - start,
        matching.len()
    );
    Ok(())
}
