use std::collections::HashMap;

use crate::models::Category;

/// Category assigned when nothing in the table matches.
pub const FALLBACK_CATEGORY: &str = "Specific";

/// Display order assigned to the fallback category.
pub const FALLBACK_CATEGORY_ORDER: u32 = 99;

/// Revision of the built-in category table below.
pub const DEFAULT_CATEGORIES_VERSION: u32 = 1;

/// Map a product name to a display category.
///
/// Two phases, first match wins, category list order defines precedence:
/// 1. Exact phase — case-insensitive substring containment in either
///    direction against each category's `products` list.
/// 2. Keyword phase — keywords of length <= 3 require a whole-word match
///    against the whitespace-tokenized name; longer keywords match by
///    substring.
///
/// The bidirectional containment of phase 1 is intentionally loose; its
/// behavior on short names is part of the observable contract.
pub fn match_category(product_name: &str, categories: &[Category]) -> String {
    let name_lower = product_name.to_lowercase();
    let name_words: Vec<&str> = name_lower.split_whitespace().collect();

    for category in categories {
        for listed in &category.products {
            let listed_lower = listed.to_lowercase();
            if name_lower.contains(&listed_lower) || listed_lower.contains(&name_lower) {
                return category.name.clone();
            }
        }
    }

    for category in categories {
        for keyword in &category.keywords {
            let keyword_lower = keyword.to_lowercase();
            if keyword_lower.len() <= 3 {
                if name_words.contains(&keyword_lower.as_str()) {
                    return category.name.clone();
                }
            } else if name_lower.contains(&keyword_lower) {
                return category.name.clone();
            }
        }
    }

    FALLBACK_CATEGORY.to_string()
}

/// Map category names to their display order.
///
/// Unknown categories fall back to their serde default order; the
/// synthetic fallback category always sorts last.
pub fn category_order(categories: &[Category]) -> HashMap<String, u32> {
    let mut order: HashMap<String, u32> = categories
        .iter()
        .map(|c| (c.name.clone(), c.order))
        .collect();
    order.insert(FALLBACK_CATEGORY.to_string(), FALLBACK_CATEGORY_ORDER);
    order
}

/// The built-in category table, used whenever the live navigation yields
/// nothing. Versioned via [`DEFAULT_CATEGORIES_VERSION`] and testable
/// independently of the site.
pub fn default_categories() -> Vec<Category> {
    fn category(name: &str, order: u32, keywords: &[&str]) -> Category {
        Category {
            name: name.to_string(),
            order,
            products: Vec::new(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    vec![
        category(
            "Infrastructure",
            1,
            &[
                "infrastructure",
                "container",
                "custom metrics",
                "ingested custom metrics",
                "serverless",
                "network",
                "cloud cost",
                "fargate",
                "azure app",
                "google cloud run",
            ],
        ),
        category(
            "Applications",
            2,
            &[
                "apm",
                "database",
                "data streams",
                "profiler",
                "continuous profiler",
                "dynamic instrumentation",
                "universal service monitoring",
                "llm observability",
                "data jobs",
            ],
        ),
        category(
            "Logs",
            3,
            &[
                "logs",
                "log management",
                "sensitive data scanner",
                "audit trail",
                "observability pipelines",
                "flex logs",
            ],
        ),
        category(
            "Security",
            4,
            &[
                "security",
                "cspm",
                "ciem",
                "cloud siem",
                "siem",
                "workload",
                "application security",
                "asm",
                "code security",
                "sca",
                "software composition",
            ],
        ),
        category(
            "Digital Experience",
            5,
            &[
                "rum",
                "real user",
                "session replay",
                "synthetic",
                "mobile rum",
                "browser rum",
                "error tracking",
                "product analytics",
            ],
        ),
        category(
            "Software Delivery",
            6,
            &[
                "ci visibility",
                "test visibility",
                "pipeline visibility",
                "continuous testing",
                "ide",
                "test optimization",
            ],
        ),
        category(
            "Service Management",
            7,
            &[
                "incident",
                "on-call",
                "case management",
                "workflow automation",
                "slo",
                "service level",
                "event management",
            ],
        ),
        category("AI", 8, &["ai", "llm", "bits ai"]),
    ]
}
