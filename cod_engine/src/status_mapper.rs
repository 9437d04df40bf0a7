//! Maps source-specific status vocabularies onto [`CanonicalStatus`].
//!
//! The worksheet and the external feed use disjoint vocabularies, so each has its own table. The two sources also
//! disagree on what to do with an unknown status: worksheet statuses without an entry are ignored, while unknown
//! feed statuses are treated as an incident.
use std::collections::HashMap;

use log::*;

use crate::db_types::{CanonicalStatus, StatusSource};

#[derive(Debug, Clone)]
pub struct StatusMapper {
    worksheet: HashMap<String, CanonicalStatus>,
    external_feed: HashMap<String, CanonicalStatus>,
    feed_fallback: CanonicalStatus,
}

impl Default for StatusMapper {
    fn default() -> Self {
        use CanonicalStatus::*;
        let worksheet = [("Charged", Delivered), ("Delivered", Delivered), ("Reject", Returned), ("Incidence", Incident)];
        let external_feed = [
            ("DELIVERED", Delivered),
            ("CHARGED", Delivered),
            ("REJECTED", Returned),
            ("CANCELLED", Returned),
            ("RETURNED", Returned),
            ("TRANSIT", InTransit),
            ("PREPARED", InTransit),
            ("PENDING", InTransit),
            ("INCIDENCE", Incident),
        ];
        Self::new(worksheet, external_feed, Incident)
    }
}

impl StatusMapper {
    pub fn new<W, E, S>(worksheet: W, external_feed: E, feed_fallback: CanonicalStatus) -> Self
    where
        W: IntoIterator<Item = (S, CanonicalStatus)>,
        E: IntoIterator<Item = (S, CanonicalStatus)>,
        S: Into<String>,
    {
        let worksheet = worksheet.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let external_feed = external_feed.into_iter().map(|(k, v)| (k.into(), v)).collect();
        Self { worksheet, external_feed, feed_fallback }
    }

    /// Maps `source_status` to the canonical vocabulary. `None` means the update must be ignored.
    pub fn map_status(&self, source_status: &str, source: StatusSource) -> Option<CanonicalStatus> {
        let key = source_status.trim();
        match source {
            StatusSource::Worksheet => {
                let result = self.worksheet.get(key).copied();
                if result.is_none() {
                    trace!("🔄️ Worksheet status '{key}' has no canonical equivalent. Ignoring it.");
                }
                result
            },
            StatusSource::ExternalFeed => match self.external_feed.get(key) {
                Some(status) => Some(*status),
                None => {
                    debug!("🔄️ Unknown feed status '{key}'. Treating it as {}", self.feed_fallback);
                    Some(self.feed_fallback)
                },
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::db_types::CanonicalStatus::*;

    #[test]
    fn worksheet_statuses() {
        let mapper = StatusMapper::default();
        assert_eq!(mapper.map_status("Charged", StatusSource::Worksheet), Some(Delivered));
        assert_eq!(mapper.map_status("Delivered ", StatusSource::Worksheet), Some(Delivered));
        assert_eq!(mapper.map_status("Reject", StatusSource::Worksheet), Some(Returned));
        assert_eq!(mapper.map_status("Incidence", StatusSource::Worksheet), Some(Incident));
        assert_eq!(mapper.map_status("Shipped", StatusSource::Worksheet), None);
        assert_eq!(mapper.map_status("", StatusSource::Worksheet), None);
    }

    #[test]
    fn feed_statuses() {
        let mapper = StatusMapper::default();
        assert_eq!(mapper.map_status("CHARGED", StatusSource::ExternalFeed), Some(Delivered));
        assert_eq!(mapper.map_status("CANCELLED", StatusSource::ExternalFeed), Some(Returned));
        assert_eq!(mapper.map_status("PREPARED", StatusSource::ExternalFeed), Some(InTransit));
        assert_eq!(mapper.map_status("INCIDENCE", StatusSource::ExternalFeed), Some(Incident));
    }

    #[test]
    fn unknown_feed_status_is_an_incident() {
        let mapper = StatusMapper::default();
        assert_eq!(mapper.map_status("LOST_IN_SPACE", StatusSource::ExternalFeed), Some(Incident));
        // The worksheet vocabulary is case-sensitive and distinct from the feed's
        assert_eq!(mapper.map_status("CHARGED", StatusSource::Worksheet), None);
    }
}
