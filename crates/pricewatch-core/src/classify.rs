use crate::models::{Plan, ProductType};
use crate::rules::ClassifierRules;

/// Extract the plan tier from a product name.
///
/// Substring match on the lowercased name with fixed precedence:
/// "enterprise" beats "pro" beats the default `All`.
pub fn plan_for(product_name: &str) -> Plan {
    let lower = product_name.to_lowercase();
    if lower.contains("enterprise") {
        Plan::Enterprise
    } else if lower.contains("pro") {
        Plan::Pro
    } else {
        Plan::All
    }
}

/// Classify a product as a base subscription or a usage-based add-on.
///
/// Evaluated in fixed order, first match wins:
/// 1. Pro/Enterprise plan products are main.
/// 2. Host- or session-based billing units are main.
/// 3. Curated core product names are main.
/// 4. Everything else is an addon.
pub fn product_type_for(
    product_name: &str,
    plan: Plan,
    billing_unit: &str,
    rules: &ClassifierRules,
) -> ProductType {
    if matches!(plan, Plan::Pro | Plan::Enterprise) {
        return ProductType::Main;
    }

    let unit_lower = billing_unit.to_lowercase();
    if rules
        .main_unit_markers
        .iter()
        .any(|marker| unit_lower.contains(marker.as_str()))
    {
        return ProductType::Main;
    }

    let name_lower = product_name.to_lowercase();
    if rules
        .main_product_keywords
        .iter()
        .any(|keyword| name_lower.contains(keyword.as_str()))
    {
        return ProductType::Main;
    }

    ProductType::Addon
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_precedence() {
        assert_eq!(plan_for("Infrastructure Enterprise"), Plan::Enterprise);
        assert_eq!(plan_for("Infrastructure Pro"), Plan::Pro);
        assert_eq!(plan_for("Custom Metrics"), Plan::All);
        // "enterprise" wins even when "pro" is also present
        assert_eq!(plan_for("Pro Enterprise Bundle"), Plan::Enterprise);
    }

    #[test]
    fn test_plan_is_case_insensitive() {
        assert_eq!(plan_for("INFRASTRUCTURE ENTERPRISE"), Plan::Enterprise);
        assert_eq!(plan_for("infrastructure pro"), Plan::Pro);
    }

    #[test]
    fn test_paid_plans_are_main() {
        let rules = ClassifierRules::default();
        assert_eq!(
            product_type_for("Infrastructure Pro", Plan::Pro, "per host", &rules),
            ProductType::Main
        );
        assert_eq!(
            product_type_for("Anything Enterprise", Plan::Enterprise, "per GB", &rules),
            ProductType::Main
        );
    }

    #[test]
    fn test_host_and_session_units_are_main() {
        let rules = ClassifierRules::default();
        assert_eq!(
            product_type_for("APM", Plan::All, "per APM host", &rules),
            ProductType::Main
        );
        assert_eq!(
            product_type_for("Session Replay", Plan::All, "per 1k sessions", &rules),
            ProductType::Main
        );
    }

    #[test]
    fn test_curated_names_are_main() {
        let rules = ClassifierRules::default();
        assert_eq!(
            product_type_for("Log Management", Plan::All, "per million events", &rules),
            ProductType::Main
        );
        assert_eq!(
            product_type_for("Cloud SIEM", Plan::All, "per GB analyzed", &rules),
            ProductType::Main
        );
    }

    #[test]
    fn test_usage_items_default_to_addon() {
        let rules = ClassifierRules::default();
        assert_eq!(
            product_type_for("Custom Metrics", Plan::All, "per 100 metrics", &rules),
            ProductType::Addon
        );
        assert_eq!(
            product_type_for("Ingested Spans", Plan::All, "per GB", &rules),
            ProductType::Addon
        );
    }
}
