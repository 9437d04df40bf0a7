use std::{collections::HashMap, fmt::Debug};

use chrono::{DateTime, Utc};
use log::*;
use thiserror::Error;

use crate::{
    db_types::{ChangeRecord, Order, OrderId, StatusSource, StatusUpdate},
    events::{EventProducers, StatusSyncCompletedEvent},
    reconciliation::{next_status, ReconciliationOutcome, SyncReport, Transition},
    status_mapper::StatusMapper,
    sync::{collect_feed_updates, worksheet_updates, OrderFeed, WorksheetRow, DEFAULT_MAX_PAGES},
    traits::OrderLedger,
};

#[derive(Debug, Clone, Error)]
pub enum ReconciliationError {
    #[error("The order ledger is not available: {0}")]
    LedgerUnavailable(String),
    #[error("The order ledger is empty")]
    EmptyLedger,
    #[error("The worksheet is missing or empty. Import it before syncing.")]
    EmptyWorksheet,
    #[error("Could not update row {row} after applying {applied} changes: {message}")]
    LedgerWrite { row: usize, applied: usize, message: String },
}

/// `ReconciliationApi` applies reported statuses to the ledger under the reconciliation rules, and runs the two sync
/// flows (worksheet import and external feed) end to end.
pub struct ReconciliationApi<B> {
    ledger: B,
    mapper: StatusMapper,
    producers: EventProducers,
    max_pages: u32,
}

impl<B> Debug for ReconciliationApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ReconciliationApi")
    }
}

impl<B> ReconciliationApi<B> {
    pub fn new(ledger: B, mapper: StatusMapper, producers: EventProducers) -> Self {
        Self { ledger, mapper, producers, max_pages: DEFAULT_MAX_PAGES }
    }

    /// Sets the maximum number of feed pages a single sync will fetch.
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    pub fn ledger(&self) -> &B {
        &self.ledger
    }

    pub fn mapper(&self) -> &StatusMapper {
        &self.mapper
    }
}

impl<B> ReconciliationApi<B>
where B: OrderLedger
{
    async fn fetch_ledger(&self) -> Result<Vec<Order>, ReconciliationError> {
        self.ledger.fetch_all_orders().await.map_err(|e| {
            error!("🔄️ Could not read the order ledger. {e}");
            ReconciliationError::LedgerUnavailable(e.to_string())
        })
    }

    /// Applies `updates` to the ledger, stamping changes with the current time. See [`Self::reconcile_at`].
    pub async fn reconcile(&self, updates: &[StatusUpdate]) -> Result<ReconciliationOutcome, ReconciliationError> {
        self.reconcile_at(updates, Utc::now()).await
    }

    /// Applies `updates` to the ledger, in order.
    ///
    /// An update applies to every row carrying its id. Updates see the effect of earlier updates in the same batch,
    /// so `TRANSIT` followed by `INCIDENCE` for one order ends in `INCIDENCIA`. If a ledger write fails the batch
    /// stops; earlier changes stay applied.
    pub async fn reconcile_at(
        &self,
        updates: &[StatusUpdate],
        now: DateTime<Utc>,
    ) -> Result<ReconciliationOutcome, ReconciliationError> {
        let mut orders = self.fetch_ledger().await?;
        self.apply(&mut orders, updates, now).await
    }

    async fn apply(
        &self,
        orders: &mut [Order],
        updates: &[StatusUpdate],
        now: DateTime<Utc>,
    ) -> Result<ReconciliationOutcome, ReconciliationError> {
        let mut rows_by_id: HashMap<OrderId, Vec<usize>> = HashMap::new();
        for (row, order) in orders.iter().enumerate() {
            rows_by_id.entry(order.external_id.clone()).or_default().push(row);
        }
        let mut outcome = ReconciliationOutcome::default();
        for update in updates {
            let Some(rows) = rows_by_id.get(&update.external_id) else {
                trace!("🔄️ {} is not in the ledger", update.external_id);
                outcome.skipped.no_match += 1;
                continue;
            };
            for &row in rows {
                let order = &mut orders[row];
                let prior = order.current_status;
                let new = match next_status(prior, update.reported) {
                    Transition::Apply(status) => status,
                    Transition::Terminal => {
                        trace!("🔄️ {} is final ({prior:?}). Ignoring {}", order.external_id, update.reported);
                        outcome.skipped.terminal += 1;
                        continue;
                    },
                    Transition::ManualHold => {
                        debug!("🔄️ {} is on hold ({prior:?}). Ignoring {}", order.external_id, update.reported);
                        outcome.skipped.manual_hold += 1;
                        continue;
                    },
                    Transition::Unchanged => {
                        trace!("🔄️ {} is already {}", order.external_id, update.reported);
                        outcome.skipped.unchanged += 1;
                        continue;
                    },
                };
                self.ledger.update_order_status(row, new).await.map_err(|e| ReconciliationError::LedgerWrite {
                    row,
                    applied: outcome.changes.len(),
                    message: e.to_string(),
                })?;
                order.current_status = Some(new);
                let change = ChangeRecord {
                    external_id: order.external_id.clone(),
                    row,
                    order_date: order.order_date,
                    customer_name: order.customer_name.clone(),
                    prior,
                    new,
                    timestamp: now,
                    tracking_ref: update.tracking_ref.clone(),
                    source: update.source,
                    source_status: update.source_status.clone(),
                };
                debug!("🔄️ {change}");
                outcome.changes.push(change);
            }
        }
        info!("🔄️ Reconciliation applied {} changes. Skipped: {}", outcome.changes.len(), outcome.skipped);
        Ok(outcome)
    }

    /// Ledger orders that a feed sync can still move, i.e. those `En tránsito` or in `INCIDENCIA`.
    pub async fn fetch_pending_orders(&self) -> Result<Vec<(usize, Order)>, ReconciliationError> {
        let orders = self.fetch_ledger().await?;
        let pending = orders
            .into_iter()
            .enumerate()
            .filter(|(_, o)| o.current_status.is_some_and(|s| s.is_pending()))
            .collect::<Vec<_>>();
        debug!("🔄️ {} orders are pending", pending.len());
        Ok(pending)
    }

    /// Imports the manual worksheet.
    ///
    /// Both the worksheet and the ledger must be non-empty; otherwise nothing is touched and an error is returned.
    pub async fn sync_from_worksheet(&self, rows: &[WorksheetRow]) -> Result<SyncReport, ReconciliationError> {
        if rows.is_empty() {
            return Err(ReconciliationError::EmptyWorksheet);
        }
        let mut orders = self.fetch_ledger().await?;
        if orders.is_empty() {
            return Err(ReconciliationError::EmptyLedger);
        }
        info!("🔄️ Importing {} worksheet rows", rows.len());
        let normalized = worksheet_updates(rows, &self.mapper);
        let outcome = self.apply(&mut orders, &normalized.updates, Utc::now()).await?;
        let mut report = SyncReport::new(StatusSource::Worksheet);
        report.skipped = outcome.skipped;
        report.skipped.malformed += normalized.malformed;
        report.skipped.unmapped += normalized.unmapped;
        report.changes = outcome.changes;
        self.call_sync_completed_hook(&report).await;
        Ok(report)
    }

    /// Pulls every page of the external feed and reconciles what it reports.
    ///
    /// If no order is pending the feed is not queried at all. A page failure stops the walk, but the updates
    /// collected up to that point are still applied and the report notes the truncation.
    pub async fn sync_from_feed<F: OrderFeed>(&self, feed: &F) -> Result<SyncReport, ReconciliationError> {
        let mut orders = self.fetch_ledger().await?;
        let mut report = SyncReport::new(StatusSource::ExternalFeed);
        let pending = orders.iter().filter(|o| o.current_status.is_some_and(|s| s.is_pending())).count();
        if pending == 0 {
            info!("🔄️ No orders are pending. Nothing to sync from the feed.");
            self.call_sync_completed_hook(&report).await;
            return Ok(report);
        }
        info!("🔄️ {pending} orders are pending. Querying the order feed.");
        let collected = collect_feed_updates(feed, &self.mapper, self.max_pages).await;
        let outcome = self.apply(&mut orders, &collected.updates, Utc::now()).await?;
        report.skipped = outcome.skipped;
        report.skipped.malformed += collected.malformed;
        report.skipped.unmapped += collected.unmapped;
        report.changes = outcome.changes;
        report.pages_fetched = collected.pages_fetched;
        report.truncation = collected.truncation;
        self.call_sync_completed_hook(&report).await;
        Ok(report)
    }

    async fn call_sync_completed_hook(&self, report: &SyncReport) {
        for emitter in &self.producers.sync_completed_producer {
            debug!("🔄️ Notifying sync completed hook subscribers");
            let event = StatusSyncCompletedEvent::new(report.source, report.changes.clone());
            emitter.publish_event(event).await;
        }
    }
}
