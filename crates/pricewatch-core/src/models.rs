use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Plan tier a product is sold under.
///
/// `All` means the product is available regardless of plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Plan {
    Enterprise,
    Pro,
    All,
}

/// Whether a product is a base subscription or a usage-based add-on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductType {
    Main,
    Addon,
}

/// The three independently nullable price columns of a product row.
///
/// Values are kept as the raw cell text ("$15", "0.10", ...); absent is
/// distinct from zero. Use [`crate::util::parse_price`] for numeric views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceField {
    BilledAnnually,
    BilledMonthToMonth,
    OnDemand,
}

impl PriceField {
    pub const ALL: [PriceField; 3] = [
        PriceField::BilledAnnually,
        PriceField::BilledMonthToMonth,
        PriceField::OnDemand,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::BilledAnnually => "billed_annually",
            PriceField::BilledMonthToMonth => "billed_month_to_month",
            PriceField::OnDemand => "on_demand",
        }
    }
}

/// One normalized product row of a region snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Stable short hash of (product, billing_unit), see [`generate_product_id`].
    pub id: String,
    pub region: String,
    pub product: String,
    pub category: String,
    pub plan: Plan,
    pub product_type: ProductType,
    pub billing_unit: String,
    pub billed_annually: Option<String>,
    pub billed_month_to_month: Option<String>,
    pub on_demand: Option<String>,
}

impl ProductRecord {
    pub fn price(&self, field: PriceField) -> Option<&str> {
        match field {
            PriceField::BilledAnnually => self.billed_annually.as_deref(),
            PriceField::BilledMonthToMonth => self.billed_month_to_month.as_deref(),
            PriceField::OnDemand => self.on_demand.as_deref(),
        }
    }
}

/// All three price fields of a record, used as the payload of
/// add/remove change events.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PriceSet {
    pub billed_annually: Option<String>,
    pub billed_month_to_month: Option<String>,
    pub on_demand: Option<String>,
}

impl From<&ProductRecord> for PriceSet {
    fn from(record: &ProductRecord) -> Self {
        Self {
            billed_annually: record.billed_annually.clone(),
            billed_month_to_month: record.billed_month_to_month.clone(),
            on_demand: record.on_demand.clone(),
        }
    }
}

/// A display category for grouping products.
///
/// Categories are region-independent and shared across all snapshots.
/// `products` carries exact names mined from the source site's navigation;
/// `keywords` carries the fallback heuristic terms of the built-in table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    /// Display rank; lower sorts first.
    #[serde(default = "default_category_order")]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub keywords: Vec<String>,
}

fn default_category_order() -> u32 {
    50
}

/// One detected difference between two consecutive snapshots of a region.
///
/// Immutable once written; the history is a strictly append-ordered
/// sequence capped at [`crate::history::CHANGE_HISTORY_CAP`] records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub timestamp: DateTime<Utc>,
    pub region: String,
    pub product: String,
    pub product_id: String,
    pub category: String,
    #[serde(flatten)]
    pub change: Change,
}

/// The kind-specific payload of a change record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Change {
    ProductAdded {
        data: PriceSet,
    },
    PriceChange {
        field: PriceField,
        old_value: Option<String>,
        new_value: Option<String>,
    },
    ProductRemoved {
        data: PriceSet,
    },
}

/// Per-region sync metadata, fully replaced on each successful sync.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionMetadata {
    pub region: String,
    pub region_name: String,
    pub site: String,
    pub last_sync: DateTime<Utc>,
    pub products_count: usize,
    pub source_url: String,
}

/// One raw table from the listing markup: rows of trimmed cell texts.
///
/// The HTML mechanics live in the client crate; extraction semantics
/// operate on this shape only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub rows: Vec<Vec<String>>,
}

/// Generate a stable, deterministic product ID from name and billing unit.
///
/// `sha256(lowercase(trim(product)) + "|" + lowercase(trim(unit)))`,
/// truncated to 12 hex chars. Case- and surrounding-whitespace-insensitive;
/// collisions between distinct pairs are negligible and not defended against.
pub fn generate_product_id(product: &str, billing_unit: &str) -> String {
    let key = format!(
        "{}|{}",
        product.trim().to_lowercase(),
        billing_unit.trim().to_lowercase()
    );
    let digest = Sha256::digest(key.as_bytes());
    format!("{digest:x}")[..12].to_string()
}
