use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};

use crate::models::{Change, ChangeRecord, PriceField, PriceSet, ProductRecord};

/// Diff two snapshots of the same region into add/change/remove events.
///
/// Pure comparison: no storage access, never fails. Every emitted event
/// carries the single `timestamp` supplied by the caller. Output order
/// follows the new snapshot for additions/changes, then the old snapshot
/// for removals, so results are deterministic.
pub fn detect_changes(
    old: &[ProductRecord],
    new: &[ProductRecord],
    region: &str,
    timestamp: DateTime<Utc>,
) -> Vec<ChangeRecord> {
    let old_by_id: HashMap<&str, &ProductRecord> =
        old.iter().map(|r| (r.id.as_str(), r)).collect();
    let new_ids: HashSet<&str> = new.iter().map(|r| r.id.as_str()).collect();

    let mut changes = Vec::new();
    let event = |record: &ProductRecord, change: Change| ChangeRecord {
        timestamp,
        region: region.to_string(),
        product: record.product.clone(),
        product_id: record.id.clone(),
        category: record.category.clone(),
        change,
    };

    for item in new {
        match old_by_id.get(item.id.as_str()) {
            None => changes.push(event(
                item,
                Change::ProductAdded {
                    data: PriceSet::from(item),
                },
            )),
            Some(previous) => {
                // Each price field is compared independently; a product with
                // two differing fields yields two events.
                for field in PriceField::ALL {
                    let old_value = previous.price(field);
                    let new_value = item.price(field);
                    if old_value != new_value {
                        changes.push(event(
                            item,
                            Change::PriceChange {
                                field,
                                old_value: old_value.map(str::to_string),
                                new_value: new_value.map(str::to_string),
                            },
                        ));
                    }
                }
            }
        }
    }

    for item in old {
        if !new_ids.contains(item.id.as_str()) {
            changes.push(event(
                item,
                Change::ProductRemoved {
                    data: PriceSet::from(item),
                },
            ));
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Plan, ProductType};

    fn record(id: &str, annually: Option<&str>) -> ProductRecord {
        ProductRecord {
            id: id.into(),
            region: "us".into(),
            product: "Infrastructure Pro".into(),
            category: "Infrastructure".into(),
            plan: Plan::Pro,
            product_type: ProductType::Main,
            billing_unit: "per host".into(),
            billed_annually: annually.map(str::to_string),
            billed_month_to_month: Some("18".into()),
            on_demand: None,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc::now()
    }

    #[test]
    fn test_identical_snapshots_emit_nothing() {
        let snapshot = vec![record("abc123", Some("15"))];
        assert!(detect_changes(&snapshot, &snapshot, "us", now()).is_empty());
    }

    #[test]
    fn test_single_field_price_change() {
        let old = vec![record("abc123", Some("15"))];
        let new = vec![record("abc123", Some("18"))];
        let changes = detect_changes(&old, &new, "us", now());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].product_id, "abc123");
        assert_eq!(
            changes[0].change,
            Change::PriceChange {
                field: PriceField::BilledAnnually,
                old_value: Some("15".into()),
                new_value: Some("18".into()),
            }
        );
    }

    #[test]
    fn test_two_changed_fields_yield_two_events() {
        let old = vec![record("abc123", Some("15"))];
        let mut updated = record("abc123", Some("16"));
        updated.billed_month_to_month = Some("19".into());
        let changes = detect_changes(&old, &[updated], "us", now());
        assert_eq!(changes.len(), 2);
        assert!(matches!(
            changes[0].change,
            Change::PriceChange {
                field: PriceField::BilledAnnually,
                ..
            }
        ));
        assert!(matches!(
            changes[1].change,
            Change::PriceChange {
                field: PriceField::BilledMonthToMonth,
                ..
            }
        ));
    }

    #[test]
    fn test_none_to_value_transition_is_a_change() {
        let old = vec![record("abc123", None)];
        let new = vec![record("abc123", Some("20"))];
        let changes = detect_changes(&old, &new, "us", now());
        assert_eq!(changes.len(), 1);
        assert_eq!(
            changes[0].change,
            Change::PriceChange {
                field: PriceField::BilledAnnually,
                old_value: None,
                new_value: Some("20".into()),
            }
        );
    }

    #[test]
    fn test_addition_carries_all_prices() {
        let new = vec![record("def456", Some("23"))];
        let changes = detect_changes(&[], &new, "us", now());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].product_id, "def456");
        assert_eq!(
            changes[0].change,
            Change::ProductAdded {
                data: PriceSet {
                    billed_annually: Some("23".into()),
                    billed_month_to_month: Some("18".into()),
                    on_demand: None,
                }
            }
        );
    }

    #[test]
    fn test_removal_carries_old_prices() {
        let old = vec![record("ghi789", Some("42"))];
        let changes = detect_changes(&old, &[], "us", now());
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].product_id, "ghi789");
        assert_eq!(
            changes[0].change,
            Change::ProductRemoved {
                data: PriceSet {
                    billed_annually: Some("42".into()),
                    billed_month_to_month: Some("18".into()),
                    on_demand: None,
                }
            }
        );
    }

    #[test]
    fn test_all_events_share_one_timestamp() {
        let stamp = now();
        let old = vec![record("abc123", Some("15")), record("ghi789", Some("1"))];
        let new = vec![record("abc123", Some("18")), record("def456", Some("2"))];
        let changes = detect_changes(&old, &new, "us", stamp);
        assert_eq!(changes.len(), 3);
        assert!(changes.iter().all(|c| c.timestamp == stamp));
    }
}
