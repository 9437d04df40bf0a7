//! In-process backends for the collaborator traits. The CLI loads its JSON ledger into an [`InMemoryLedger`] and
//! keeps the geolocation cache in a [`MemoryCache`] for the duration of a run.
mod cache;
mod ledger;

pub use cache::{MemoryCache, DEFAULT_MAX_ENTRIES};
pub use ledger::{InMemoryLedger, LedgerError};
