use pricewatch_core::error::AppError;
use pricewatch_core::models::{Category, RawTable};
use pricewatch_core::traits::PageParser;
use scraper::{ElementRef, Html, Selector};

/// Class-name fragments that mark an element as navigation/sidebar chrome
/// worth mining for category groups.
const NAV_CLASS_MARKERS: &[&str] = &["nav", "sidebar", "menu", "pricing"];

/// Links shorter than this are arrows/icons, not product names.
const MIN_LINK_TEXT_LEN: usize = 3;

/// At most this many product links are read per category group.
const MAX_LINKS_PER_GROUP: usize = 20;

/// HTML mechanics for the pricing pages, using scraper.
///
/// Produces raw tables of trimmed cell text and category groups mined from
/// heading + link-list patterns in navigation containers. All semantics
/// (skip rules, classification, dedup) live in the core crate.
#[derive(Clone)]
pub struct HtmlPageParser {
    table: Selector,
    row: Selector,
    cell: Selector,
    container: Selector,
    heading: Selector,
    link: Selector,
}

impl HtmlPageParser {
    pub fn new() -> Result<Self, AppError> {
        Ok(Self {
            table: parse_selector("table")?,
            row: parse_selector("tr")?,
            cell: parse_selector("th, td")?,
            container: parse_selector("nav, aside, div")?,
            heading: parse_selector("h2, h3, h4")?,
            link: parse_selector("a")?,
        })
    }
}

impl PageParser for HtmlPageParser {
    fn parse_price_tables(&self, html: &str) -> Result<Vec<RawTable>, AppError> {
        let document = Html::parse_document(html);
        let mut tables = Vec::new();

        for table in document.select(&self.table) {
            let mut rows = Vec::new();
            for row in table.select(&self.row) {
                let cells: Vec<String> = row.select(&self.cell).map(element_text).collect();
                if !cells.is_empty() {
                    rows.push(cells);
                }
            }
            if !rows.is_empty() {
                tables.push(RawTable { rows });
            }
        }

        tracing::debug!(tables = tables.len(), "parsed listing tables");
        Ok(tables)
    }

    fn parse_category_nav(&self, html: &str) -> Result<Vec<Category>, AppError> {
        let document = Html::parse_document(html);
        let mut groups: Vec<(String, Vec<String>)> = Vec::new();

        for container in document.select(&self.container) {
            if !is_nav_container(container) {
                continue;
            }
            for heading in container.select(&self.heading) {
                let name = element_text(heading);
                if name.len() < 2 {
                    continue;
                }
                let Some(list) = following_list_element(heading) else {
                    continue;
                };
                let products: Vec<String> = list
                    .select(&self.link)
                    .take(MAX_LINKS_PER_GROUP)
                    .map(element_text)
                    .filter(|text| text.len() >= MIN_LINK_TEXT_LEN)
                    .collect();
                if !products.is_empty() {
                    groups.push((name, products));
                }
            }
        }

        Ok(groups
            .into_iter()
            .enumerate()
            .map(|(index, (name, products))| Category {
                name,
                order: index as u32 + 1,
                products,
                keywords: Vec::new(),
            })
            .collect())
    }
}

fn parse_selector(selector: &str) -> Result<Selector, AppError> {
    Selector::parse(selector).map_err(|e| AppError::ParseError(e.to_string()))
}

/// Element text with all interior whitespace collapsed to single spaces.
fn element_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_nav_container(element: ElementRef) -> bool {
    let Some(class) = element.value().attr("class") else {
        return false;
    };
    let class_lower = class.to_lowercase();
    NAV_CLASS_MARKERS
        .iter()
        .any(|marker| class_lower.contains(marker))
}

/// The first element following a heading among its siblings that could hold
/// a product list.
fn following_list_element(heading: ElementRef) -> Option<ElementRef> {
    heading
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "ul" | "div"))
}
