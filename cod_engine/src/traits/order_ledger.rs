use std::fmt::Display;

use crate::db_types::{CanonicalStatus, Order};

/// The authoritative collection of order rows.
///
/// Rows are addressed by their position in the collection, as returned by [`OrderLedger::fetch_all_orders`].
/// Row positions are stable for the duration of a run because exactly one run touches the ledger at a time.
#[allow(async_fn_in_trait)]
pub trait OrderLedger {
    type Error: Display;

    /// Fetches every order in the ledger, in row order.
    ///
    /// An error here means the ledger itself is unavailable, which callers treat as a fatal precondition failure.
    async fn fetch_all_orders(&self) -> Result<Vec<Order>, Self::Error>;

    async fn update_order_status(&self, row: usize, status: CanonicalStatus) -> Result<(), Self::Error>;

    async fn update_risk_label(&self, row: usize, label: &str) -> Result<(), Self::Error>;
}
