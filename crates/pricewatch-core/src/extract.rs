use std::collections::HashSet;

use crate::categorize::match_category;
use crate::classify::{plan_for, product_type_for};
use crate::models::{Category, ProductRecord, RawTable, generate_product_id};
use crate::rules::ClassifierRules;

/// Tables narrower than this are navigation/comparison widgets, not price
/// tables.
pub const MIN_PRICE_TABLE_COLUMNS: usize = 4;

/// Billing unit assigned when the unit cell is blank.
pub const DEFAULT_BILLING_UNIT: &str = "per unit";

/// Turn raw listing tables into deduplicated, classified product records.
///
/// Row-level failures (empty names, header rows, price-less rows) skip the
/// row and continue; partial data beats aborting the pass.
pub fn extract_products(
    tables: &[RawTable],
    region: &str,
    categories: &[Category],
    rules: &ClassifierRules,
) -> Vec<ProductRecord> {
    let mut records = Vec::new();

    for table in tables {
        let Some(header) = table.rows.first() else {
            continue;
        };
        if header.len() < MIN_PRICE_TABLE_COLUMNS {
            continue;
        }
        for row in &table.rows {
            if let Some(record) = record_from_row(row, region, categories, rules) {
                records.push(record);
            }
        }
    }

    dedupe_products(records)
}

/// Collapse duplicate rows within one extraction pass.
///
/// Keyed by cleaned (product, billing_unit); the first row encountered for
/// a key wins, input order is otherwise preserved.
pub fn dedupe_products(records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|r| seen.insert((r.product.clone(), r.billing_unit.clone())))
        .collect()
}

fn record_from_row(
    cells: &[String],
    region: &str,
    categories: &[Category],
    rules: &ClassifierRules,
) -> Option<ProductRecord> {
    let raw_name = cells.first()?.trim();
    if raw_name.is_empty() || raw_name.eq_ignore_ascii_case("product") {
        return None;
    }
    let raw_unit = cells.get(1).map(|c| c.trim()).unwrap_or_default();

    // Some rows repeat the billing unit inside the product cell.
    let name = if !raw_unit.is_empty() && raw_name.contains(raw_unit) {
        raw_name.replace(raw_unit, "")
    } else {
        raw_name.to_string()
    };

    let product = name.replace('*', "").trim().to_string();
    if product.is_empty() {
        return None;
    }
    let billing_unit = match raw_unit.replace('*', "").trim() {
        "" => DEFAULT_BILLING_UNIT.to_string(),
        unit => unit.to_string(),
    };

    let price_at = |index: usize| {
        cells
            .get(index)
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
    };
    let billed_annually = price_at(2);
    let billed_month_to_month = price_at(3);
    let on_demand = price_at(4);

    if billed_annually.is_none() && billed_month_to_month.is_none() && on_demand.is_none() {
        return None;
    }

    let category = match_category(&product, categories);
    let plan = plan_for(&product);
    let product_type = product_type_for(&product, plan, &billing_unit, rules);

    Some(ProductRecord {
        id: generate_product_id(&product, &billing_unit),
        region: region.to_string(),
        product,
        category,
        plan,
        product_type,
        billing_unit,
        billed_annually,
        billed_month_to_month,
        on_demand,
    })
}
