use cod_common::clean_id;
use cod_engine::sync::{FeedOrder, FeedPage};
use serde::{Deserialize, Serialize};

use crate::helpers::{optional_string_or_number, string_or_number};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropeaOrder {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    /// The shop's order number, which is the ledger's external id
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub external_order_id: Option<String>,
    #[serde(default)]
    pub tracking_code: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl From<DropeaOrder> for FeedOrder {
    fn from(order: DropeaOrder) -> Self {
        FeedOrder {
            id: order.id,
            status: order.status,
            external_order_id: order.external_order_id.map(|id| clean_id(&id)).filter(|id| !id.is_empty()),
            tracking_code: order.tracking_code,
            created_at: order.created_at,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    #[serde(rename = "totalPages", alias = "total_pages")]
    pub total_pages: u32,
}

/// The `orders` field of a Dropea orders query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DropeaOrders {
    #[serde(default)]
    pub data: Vec<DropeaOrder>,
    #[serde(default)]
    pub pagination: Option<Pagination>,
}

impl DropeaOrders {
    /// Converts the response for `requested` into a feed page. A response without pagination is a single page.
    pub fn into_feed_page(self, requested: u32) -> FeedPage {
        let (page, total_pages) = match self.pagination {
            Some(p) => (p.page, p.total_pages),
            None => (requested, requested),
        };
        FeedPage { orders: self.data.into_iter().map(FeedOrder::from).collect(), page, total_pages }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn shop_order_numbers_are_cleaned() {
        let order = DropeaOrder { id: "1".into(), external_order_id: Some("#10.452".into()), ..Default::default() };
        assert_eq!(FeedOrder::from(order).external_order_id.as_deref(), Some("10452"));
        let order = DropeaOrder { id: "2".into(), external_order_id: Some("n/a".into()), ..Default::default() };
        assert_eq!(FeedOrder::from(order).external_order_id, None);
    }
}
