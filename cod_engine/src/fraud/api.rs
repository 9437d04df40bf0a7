use std::fmt::Debug;

use chrono::{DateTime, Utc};
use log::*;
use thiserror::Error;

use crate::{
    events::{EventProducers, FraudScanCompletedEvent},
    fraud::{FraudScorer, IpIndex, ScanSummary, ScoringMode},
    traits::{CacheError, GeoLocator, KeyValueCache, OrderLedger},
};

#[derive(Debug, Clone, Error)]
pub enum FraudScanError {
    #[error("The order ledger is not available: {0}")]
    LedgerUnavailable(String),
    #[error("Could not write the risk label of row {row} after scoring {processed} orders: {message}")]
    LedgerWrite { row: usize, processed: usize, message: String },
}

/// `FraudScoringApi` runs fraud scans over the whole ledger and writes the risk labels back.
pub struct FraudScoringApi<B, C, L> {
    ledger: B,
    scorer: FraudScorer<C, L>,
    producers: EventProducers,
}

impl<B, C, L> Debug for FraudScoringApi<B, C, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FraudScoringApi")
    }
}

impl<B, C, L> FraudScoringApi<B, C, L> {
    pub fn new(ledger: B, scorer: FraudScorer<C, L>, producers: EventProducers) -> Self {
        Self { ledger, scorer, producers }
    }

    pub fn ledger(&self) -> &B {
        &self.ledger
    }

    pub fn scorer(&self) -> &FraudScorer<C, L> {
        &self.scorer
    }
}

impl<B, C, L> FraudScoringApi<B, C, L>
where
    B: OrderLedger,
    C: KeyValueCache,
    L: GeoLocator,
{
    /// Scores the ledger as of now. See [`Self::scan_at`].
    pub async fn scan(&self, mode: ScoringMode, rescore: bool) -> Result<ScanSummary, FraudScanError> {
        self.scan_at(mode, rescore, Utc::now()).await
    }

    /// Scores every ledger row that has metadata, in row order.
    ///
    /// Rows that already carry a risk label are left alone unless `rescore` is set. A pause of
    /// `analysis.lookup_pause` follows every scored order. If a label cannot be written the scan stops there; labels
    /// already written stay in place.
    pub async fn scan_at(
        &self,
        mode: ScoringMode,
        rescore: bool,
        now: DateTime<Utc>,
    ) -> Result<ScanSummary, FraudScanError> {
        let orders =
            self.ledger.fetch_all_orders().await.map_err(|e| FraudScanError::LedgerUnavailable(e.to_string()))?;
        let index = IpIndex::build(&orders);
        let pause = self.scorer.config().analysis.lookup_pause;
        info!("🛡️ Starting a {mode} fraud scan over {} ledger rows (rescore: {rescore})", orders.len());
        let mut summary = ScanSummary { processed: 0, suspicious: 0, mode };
        for (row, order) in orders.iter().enumerate() {
            if order.metadata().is_none() {
                trace!("🛡️ Row {row} has no metadata");
                continue;
            }
            if !rescore && order.has_risk_label() {
                trace!("🛡️ Row {row} was already scored");
                continue;
            }
            let assessment = self.scorer.score_at(row, &index, mode, now).await;
            self.ledger.update_risk_label(row, &assessment.label).await.map_err(|e| FraudScanError::LedgerWrite {
                row,
                processed: summary.processed,
                message: e.to_string(),
            })?;
            summary.processed += 1;
            if assessment.is_suspicious() {
                summary.suspicious += 1;
                info!("🛡️ Order {} looks suspicious: {}. {}", order.external_id, assessment.label, assessment.details);
            }
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }
        info!("🛡️ Fraud scan complete. {} orders scored, {} suspicious", summary.processed, summary.suspicious);
        self.call_scan_completed_hook(summary).await;
        Ok(summary)
    }

    pub async fn flush_geo_cache(&self) -> Result<(), CacheError> {
        self.scorer.geo().flush().await
    }

    pub async fn cached_locations(&self) -> Result<usize, CacheError> {
        self.scorer.geo().cached_entries().await
    }

    async fn call_scan_completed_hook(&self, summary: ScanSummary) {
        for emitter in &self.producers.scan_completed_producer {
            debug!("🛡️ Notifying scan completed hook subscribers");
            emitter.publish_event(FraudScanCompletedEvent::new(summary)).await;
        }
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use chrono::{DateTime, Utc};
    use tokio::time::Instant;

    use super::*;
    use crate::{
        db_types::Order,
        fraud::FraudConfig,
        geo_cache::{GeoCacheConfig, GeolocationCache},
        memory::{InMemoryLedger, MemoryCache},
        test_utils::{metadata_block, StaticLocator, UnavailableLedger},
        traits::GeoResult,
    };

    fn now() -> DateTime<Utc> {
        "2026-03-10T16:00:00Z".parse().unwrap()
    }

    fn api<B: OrderLedger>(ledger: B, locator: StaticLocator) -> FraudScoringApi<B, MemoryCache, StaticLocator> {
        let geo = GeolocationCache::new(MemoryCache::default(), locator, GeoCacheConfig::default());
        FraudScoringApi::new(ledger, FraudScorer::new(geo, FraudConfig::default()), EventProducers::default())
    }

    fn ledger() -> InMemoryLedger {
        InMemoryLedger::from_orders(vec![
            Order::new("1001"),
            Order::new("1002").with_date(now()).with_metadata(metadata_block("5.5.5.5", "M", "Madrid", "Calle A")),
            Order::new("1003")
                .with_metadata(metadata_block("5.5.5.5", "M", "Madrid", "Calle B"))
                .with_risk_label("✅ CONFIABLE (0)"),
            Order::new("1004").with_metadata("Nombre: Sin IP\nProvincia: M"),
        ])
    }

    fn locator() -> StaticLocator {
        StaticLocator::default().with("5.5.5.5", GeoResult::success("Spain", "Madrid", "Madrid"))
    }

    #[tokio::test(start_paused = true)]
    async fn scans_only_unlabelled_rows() {
        let _ = env_logger::try_init();
        let ledger = ledger();
        let api = api(ledger.clone(), locator());
        let start = Instant::now();
        let summary = api.scan_at(ScoringMode::Standard, false, now()).await.unwrap();
        assert_eq!(summary, ScanSummary { processed: 2, suspicious: 0, mode: ScoringMode::Standard });
        assert_eq!(start.elapsed(), Duration::from_millis(200));
        let orders = ledger.orders().await;
        assert_eq!(orders[0].risk_label, None);
        // Calle A and Calle B under one IP
        assert_eq!(orders[1].risk_label.as_deref(), Some("✅ CONFIABLE (1)"));
        assert_eq!(orders[2].risk_label.as_deref(), Some("✅ CONFIABLE (0)"));
        assert_eq!(orders[3].risk_label.as_deref(), Some("❓ SIN DATOS"));
        assert_eq!(api.cached_locations().await.unwrap(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn rescoring_overwrites_existing_labels() {
        let ledger = ledger();
        let api = api(ledger.clone(), locator());
        let summary = api.scan_at(ScoringMode::WithHistory, true, now()).await.unwrap();
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.mode, ScoringMode::WithHistory);
        let orders = ledger.orders().await;
        // Another address, and an order from the same IP earlier today
        assert_eq!(orders[2].risk_label.as_deref(), Some("✅ CONFIABLE (2)"));
        // The second lookup of the same IP is served from the cache
        assert_eq!(api.scorer().geo().locator().calls(), 1);
        api.flush_geo_cache().await.unwrap();
        assert_eq!(api.cached_locations().await.unwrap(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn counts_suspicious_orders() {
        let orders = (0..3)
            .map(|i| {
                Order::new(format!("20{i}"))
                    .with_date(now() - chrono::Duration::minutes(i * 10))
                    .with_metadata(metadata_block("9.9.9.9", "M", "Madrid", &format!("Calle {i}")))
            })
            .collect();
        let ledger = InMemoryLedger::from_orders(orders);
        let locator = StaticLocator::default().with("9.9.9.9", GeoResult::success("Morocco", "Tanger", "Tanger"));
        let summary = api(ledger.clone(), locator).scan_at(ScoringMode::Standard, false, now()).await.unwrap();
        assert_eq!(summary.processed, 3);
        assert_eq!(summary.suspicious, 3);
        let labels = ledger.orders().await.into_iter().filter_map(|o| o.risk_label).collect::<Vec<_>>();
        assert!(labels.iter().all(|l| l == "🚨 SOSPECHOSO (9)"), "{labels:?}");
    }

    #[tokio::test]
    async fn unavailable_ledger() {
        let err = api(UnavailableLedger, locator()).scan(ScoringMode::Standard, false).await.unwrap_err();
        assert!(matches!(err, FraudScanError::LedgerUnavailable(msg) if msg == "La hoja ORDERS no existe"));
    }
}
