//! # Collaborator interfaces
//!
//! The engines in this crate never talk to storage or to the network directly. Everything they need from the
//! outside world is expressed as one of the traits below, so that the ledger can live in a spreadsheet, a JSON file
//! or in memory, and the geolocation lookup can be a real HTTP client or a test double.
//!
//! * [`OrderLedger`] is the authoritative collection of order rows. It supports reading every row and updating a
//!   row's status or risk label in place.
//! * [`KeyValueCache`] is a string-to-string store with per-entry TTL, used by the geolocation cache.
//! * [`GeoLocator`] resolves an IP address to a country, region and city.
mod data_objects;
mod geo_locator;
mod key_value_cache;
mod order_ledger;

pub use data_objects::GeoResult;
pub use geo_locator::{GeoLocator, GeoLookupError};
pub use key_value_cache::{CacheError, KeyValueCache};
pub use order_ledger::OrderLedger;
