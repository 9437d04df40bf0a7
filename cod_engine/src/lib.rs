//! COD Engine
//!
//! The core logic behind a cash-on-delivery order desk. It is storage- and provider-agnostic: the order ledger, the
//! key-value cache and the IP geolocation service are all reached through the traits in [`mod@traits`].
//!
//! The library is divided into two main sections:
//! 1. Status reconciliation ([`mod@reconciliation`]). Status reports from the shipping worksheet and from the
//!    Dropea order feed are normalized by the [`StatusMapper`] and merged into the ledger under a small set of
//!    transition rules. Terminal and manually held orders are never touched.
//! 2. Fraud risk scoring ([`mod@fraud`]). Each order's metadata block is parsed ([`mod@metadata`]) and the order is
//!    scored on IP geolocation, IP repetition and address diversity. The resulting risk label is written back to the
//!    ledger.
//!
//! Both APIs publish an event when a run completes (see [`mod@events`]), so that an audit trail can be kept without
//! the engine knowing about it. Read-only reports over the ledger live in [`mod@stats`].
pub mod db_types;
pub mod events;
pub mod fraud;
pub mod geo_cache;
pub mod helpers;
pub mod memory;
pub mod metadata;
pub mod reconciliation;
pub mod stats;
pub mod status_mapper;
pub mod sync;
pub mod traits;

#[cfg(any(feature = "test_utils", test))]
pub mod test_utils;

pub use fraud::{FraudConfig, FraudScanError, FraudScorer, FraudScoringApi, RiskAssessment, ScanSummary, ScoringMode};
pub use geo_cache::{GeoCacheConfig, GeolocationCache};
pub use memory::{InMemoryLedger, MemoryCache};
pub use metadata::MetadataRecord;
pub use reconciliation::{ReconciliationApi, ReconciliationError, SyncReport};
pub use status_mapper::StatusMapper;
