//! # Order status reconciliation
//!
//! Merges status signals from the worksheet and the external feed into the ledger. The rules, applied per update and
//! per matching ledger row:
//!
//! 1. An update whose id matches no ledger row is skipped.
//! 2. Rows in a terminal status (`Entregado`, `I. ENTREGADO`, `Devolucion`) are never changed.
//! 3. Rows on a manual hold (`FALLO AGENCIA`, `NO CONFIRMADO`) are never changed either.
//! 4. A reported `Entregado` on a row in `INCIDENCIA` lands on `I. ENTREGADO`.
//! 5. If the resulting status equals the current one nothing happens, which makes reconciliation idempotent.
//!
//! Every applied transition produces a [`ChangeRecord`](crate::db_types::ChangeRecord).
mod api;
mod report;
mod rules;

pub use api::{ReconciliationApi, ReconciliationError};
pub use report::{ReconciliationOutcome, SkipTally, SyncReport};
pub use rules::{next_status, Transition};
