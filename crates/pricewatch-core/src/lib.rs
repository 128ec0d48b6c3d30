pub mod categorize;
pub mod classify;
pub mod diff;
pub mod error;
pub mod extract;
pub mod history;
pub mod models;
pub mod regions;
pub mod rules;
pub mod sync;
pub mod traits;
pub mod util;

pub use error::AppError;
pub use models::{
    Category, Change, ChangeRecord, Plan, PriceField, PriceSet, ProductRecord, ProductType,
    RawTable, RegionMetadata, generate_product_id,
};
pub use rules::ClassifierRules;
pub use sync::{RegionStatus, RegionSyncResult, SyncOutcome, SyncService, SyncStage};
pub use traits::{Fetcher, PageParser, PricingStore};
pub use util::parse_price;
