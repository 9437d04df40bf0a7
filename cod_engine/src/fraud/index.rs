use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{db_types::Order, metadata::MetadataRecord};

/// One ledger row seen under a given IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sighting {
    pub row: usize,
    pub order_date: Option<DateTime<Utc>>,
    /// [`MetadataRecord::direccion_completa`] of the row
    pub address: String,
}

/// Parsed metadata for every ledger row plus an IP → rows index. Built once per scan so that the cross-order
/// sub-scores do not re-parse the whole ledger for every order.
#[derive(Debug, Clone, Default)]
pub struct IpIndex {
    records: Vec<Option<MetadataRecord>>,
    by_ip: HashMap<String, Vec<Sighting>>,
}

impl IpIndex {
    pub fn build(orders: &[Order]) -> Self {
        let records = orders.iter().map(|o| o.metadata().map(MetadataRecord::extract)).collect::<Vec<_>>();
        let mut by_ip: HashMap<String, Vec<Sighting>> = HashMap::new();
        for (row, (order, record)) in orders.iter().zip(records.iter()).enumerate() {
            let Some(record) = record else { continue };
            let Some(ip) = record.ip.as_ref() else { continue };
            let sighting = Sighting { row, order_date: order.order_date, address: record.direccion_completa() };
            by_ip.entry(ip.clone()).or_default().push(sighting);
        }
        Self { records, by_ip }
    }

    /// The parsed metadata of `row`, if the row has any.
    pub fn record(&self, row: usize) -> Option<&MetadataRecord> {
        self.records.get(row).and_then(Option::as_ref)
    }

    pub fn rows(&self) -> usize {
        self.records.len()
    }

    /// Every row other than `row` whose metadata carries `ip`.
    pub fn others<'a>(&'a self, ip: &str, row: usize) -> impl Iterator<Item = &'a Sighting> + 'a {
        self.by_ip.get(ip).into_iter().flatten().filter(move |s| s.row != row)
    }
}
