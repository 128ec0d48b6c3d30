/// Parse a price string like "$15", "0.10", or "1,500" into a float.
///
/// Strips every character except digits and the decimal point; an empty or
/// unparsable remainder yields 0.0. Shared by extraction consumers and
/// reporting.
pub fn parse_price(raw: &str) -> f64 {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    if cleaned.is_empty() {
        return 0.0;
    }
    cleaned.parse().unwrap_or(0.0)
}
