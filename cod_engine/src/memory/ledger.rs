use std::sync::Arc;

use log::*;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::{
    db_types::{CanonicalStatus, Order},
    traits::OrderLedger,
};

#[derive(Debug, Clone, Error)]
pub enum LedgerError {
    #[error("Row {row} does not exist. The ledger has {len} rows")]
    RowOutOfRange { row: usize, len: usize },
}

/// An [`OrderLedger`] held in memory. Clones share the same rows.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedger {
    rows: Arc<RwLock<Vec<Order>>>,
}

impl InMemoryLedger {
    pub fn from_orders(orders: Vec<Order>) -> Self {
        Self { rows: Arc::new(RwLock::new(orders)) }
    }

    /// A copy of the current rows.
    pub async fn orders(&self) -> Vec<Order> {
        self.rows.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    async fn modify<F>(&self, row: usize, f: F) -> Result<(), LedgerError>
    where F: FnOnce(&mut Order) {
        let mut rows = self.rows.write().await;
        let len = rows.len();
        let order = rows.get_mut(row).ok_or(LedgerError::RowOutOfRange { row, len })?;
        f(order);
        Ok(())
    }
}

impl OrderLedger for InMemoryLedger {
    type Error = LedgerError;

    async fn fetch_all_orders(&self) -> Result<Vec<Order>, Self::Error> {
        Ok(self.orders().await)
    }

    async fn update_order_status(&self, row: usize, status: CanonicalStatus) -> Result<(), Self::Error> {
        trace!("🗃️ Row {row} status set to {status}");
        self.modify(row, |order| order.current_status = Some(status)).await
    }

    async fn update_risk_label(&self, row: usize, label: &str) -> Result<(), Self::Error> {
        trace!("🗃️ Row {row} risk label set to {label}");
        self.modify(row, |order| order.risk_label = Some(label.to_string())).await
    }
}
