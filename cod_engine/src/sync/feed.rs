use std::fmt::Display;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{StatusSource, StatusUpdate},
    status_mapper::StatusMapper,
};

/// Guards against a feed that never reports its last page.
pub const DEFAULT_MAX_PAGES: u32 = 100;

/// One order as the external feed reports it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedOrder {
    pub id: String,
    pub status: Option<String>,
    /// The ledger's `external_id` for this order
    pub external_order_id: Option<String>,
    pub tracking_code: Option<String>,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedPage {
    pub orders: Vec<FeedOrder>,
    /// 1-based
    pub page: u32,
    pub total_pages: u32,
}

/// A paginated source of order statuses.
#[allow(async_fn_in_trait)]
pub trait OrderFeed {
    type Error: Display;

    /// Fetches page `page` (1-based).
    async fn fetch_page(&self, page: u32) -> Result<FeedPage, Self::Error>;
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedCollection {
    pub updates: Vec<StatusUpdate>,
    /// Feed orders without an external id or a status
    pub malformed: usize,
    /// Orders whose status had no canonical equivalent
    pub unmapped: usize,
    pub pages_fetched: u32,
    /// Why the walk stopped before the last page, if it did
    pub truncation: Option<String>,
}

/// Walks the feed from page 1 until the reported last page, an empty page, a failed page or `max_pages`.
///
/// A failed page is not an error: the updates collected so far are returned with `truncation` set.
pub async fn collect_feed_updates<F: OrderFeed>(feed: &F, mapper: &StatusMapper, max_pages: u32) -> FeedCollection {
    let mut result = FeedCollection::default();
    let mut page = 1;
    loop {
        if page > max_pages {
            warn!("📡️ Stopped after {max_pages} pages. The feed reports more pages than the configured limit.");
            result.truncation = Some(format!("Page limit of {max_pages} reached"));
            break;
        }
        let batch = match feed.fetch_page(page).await {
            Ok(batch) => batch,
            Err(e) => {
                warn!("📡️ Fetching page {page} failed. Continuing with the {} updates collected so far. {e}", result.updates.len());
                result.truncation = Some(format!("Page {page} failed: {e}"));
                break;
            },
        };
        result.pages_fetched += 1;
        debug!("📡️ Page {}/{} has {} orders", batch.page, batch.total_pages, batch.orders.len());
        if batch.orders.is_empty() {
            break;
        }
        let last_page = batch.page >= batch.total_pages;
        for order in batch.orders {
            collect_order(order, mapper, &mut result);
        }
        if last_page {
            break;
        }
        page += 1;
    }
    info!(
        "📡️ Collected {} status updates from {} feed pages ({} malformed)",
        result.updates.len(),
        result.pages_fetched,
        result.malformed
    );
    result
}

fn collect_order(order: FeedOrder, mapper: &StatusMapper, result: &mut FeedCollection) {
    let external_id = order.external_order_id.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let status = order.status.as_deref().map(str::trim).filter(|s| !s.is_empty());
    let (Some(external_id), Some(status)) = (external_id, status) else {
        trace!("📡️ Feed order {} has no external id or status. Skipping it.", order.id);
        result.malformed += 1;
        return;
    };
    let Some(reported) = mapper.map_status(status, StatusSource::ExternalFeed) else {
        result.unmapped += 1;
        return;
    };
    let mut update = StatusUpdate::new(external_id, reported, StatusSource::ExternalFeed).with_source_status(status);
    if let Some(tracking) = order.tracking_code.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        update = update.with_tracking_ref(tracking);
    }
    result.updates.push(update);
}
