//! Test doubles and fixture builders, shared by the unit tests and by downstream crates' tests (enable the
//! `test_utils` feature).
use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use thiserror::Error;

use crate::{
    db_types::{CanonicalStatus, Order},
    sync::{FeedOrder, FeedPage, OrderFeed},
    traits::{GeoLocator, GeoLookupError, GeoResult, OrderLedger},
};

/// A metadata block in the shop's format.
pub fn metadata_block(ip: &str, province: &str, city: &str, address: &str) -> String {
    format!(
        "Nombre: Cliente de prueba\nDirección (calle y número): {address}\nCiudad: {city}\nProvincia: {province}\n\
         Código postal: 28000\nIP address: {ip}"
    )
}

//--------------------------------------   StaticLocator     ---------------------------------------------------------
/// A [`GeoLocator`] answering from a fixed table. Unknown IPs are reported as unlocatable.
#[derive(Debug, Clone, Default)]
pub struct StaticLocator {
    results: HashMap<String, GeoResult>,
    failing: HashSet<String>,
    calls: Arc<AtomicUsize>,
}

impl StaticLocator {
    pub fn with(mut self, ip: &str, result: GeoResult) -> Self {
        self.results.insert(ip.to_string(), result);
        self
    }

    /// Lookups of `ip` fail with a transport error.
    pub fn with_error(mut self, ip: &str) -> Self {
        self.failing.insert(ip.to_string());
        self
    }

    /// The number of lookups made so far, across all clones.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl GeoLocator for StaticLocator {
    async fn locate(&self, ip: &str) -> Result<GeoResult, GeoLookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.contains(ip) {
            return Err(GeoLookupError::Transport(format!("connection to the geolocation service for {ip} refused")));
        }
        Ok(self.results.get(ip).cloned().unwrap_or_else(|| GeoResult::fail("invalid query")))
    }
}

//--------------------------------------     MemoryFeed      ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
#[error("HTTP 503 for page {0}")]
pub struct FeedUnavailable(pub u32);

/// An [`OrderFeed`] serving fixed pages, optionally failing from a given page onwards.
#[derive(Debug, Clone, Default)]
pub struct MemoryFeed {
    pages: Vec<Vec<FeedOrder>>,
    fail_from: Option<u32>,
    calls: Arc<AtomicUsize>,
}

impl MemoryFeed {
    pub fn paged(pages: Vec<Vec<FeedOrder>>) -> Self {
        Self { pages, fail_from: None, calls: Arc::default() }
    }

    pub fn failing_at(mut self, page: u32) -> Self {
        self.fail_from = Some(page);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl OrderFeed for MemoryFeed {
    type Error = FeedUnavailable;

    async fn fetch_page(&self, page: u32) -> Result<FeedPage, Self::Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_from.is_some_and(|p| page >= p) {
            return Err(FeedUnavailable(page));
        }
        let orders = page.checked_sub(1).and_then(|i| self.pages.get(i as usize)).cloned().unwrap_or_default();
        Ok(FeedPage { orders, page, total_pages: self.pages.len() as u32 })
    }
}

//--------------------------------------  UnavailableLedger  ---------------------------------------------------------
#[derive(Debug, Clone, Error)]
#[error("La hoja ORDERS no existe")]
pub struct MissingSheet;

/// An [`OrderLedger`] whose storage is gone.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableLedger;

impl OrderLedger for UnavailableLedger {
    type Error = MissingSheet;

    async fn fetch_all_orders(&self) -> Result<Vec<Order>, Self::Error> {
        Err(MissingSheet)
    }

    async fn update_order_status(&self, _row: usize, _status: CanonicalStatus) -> Result<(), Self::Error> {
        Err(MissingSheet)
    }

    async fn update_risk_label(&self, _row: usize, _label: &str) -> Result<(), Self::Error> {
        Err(MissingSheet)
    }
}
