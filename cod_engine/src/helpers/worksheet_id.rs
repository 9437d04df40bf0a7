use std::sync::OnceLock;

use regex::Regex;

use crate::db_types::OrderId;

fn trailing_number() -> &'static Regex {
    static TRAILING_NUMBER: OnceLock<Regex> = OnceLock::new();
    TRAILING_NUMBER.get_or_init(|| Regex::new(r"- (\d+)$").expect("constant regex"))
}

/// Worksheet rows identify orders with a formatted string such as `"Tienda Sur - 10452"`. The order id is the
/// run of digits after the final `"- "`.
pub fn extract_worksheet_order_id(formatted: &str) -> Option<OrderId> {
    trailing_number().captures(formatted.trim()).and_then(|c| c.get(1).map(|m| m.as_str().into()))
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn find_worksheet_ids() {
        assert_eq!(extract_worksheet_order_id(""), None);
        assert_eq!(extract_worksheet_order_id("10452"), None);
        assert_eq!(extract_worksheet_order_id("Tienda Sur - 10452").unwrap().as_str(), "10452");
        assert_eq!(extract_worksheet_order_id("A - B - 77 ").unwrap().as_str(), "77");
        assert_eq!(extract_worksheet_order_id("Tienda Sur - 10452b"), None);
        assert_eq!(extract_worksheet_order_id("Tienda Sur -10452"), None);
    }
}
