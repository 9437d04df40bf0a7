use chrono::{DateTime, Utc};
use cod_engine::{
    db_types::Order,
    events::EventProducers,
    fraud::FraudConfig,
    sync::{FeedOrder, WorksheetRow},
    test_utils::{MemoryFeed, StaticLocator},
    FraudScorer,
    FraudScoringApi,
    GeoCacheConfig,
    GeolocationCache,
    InMemoryLedger,
    MemoryCache,
    ReconciliationApi,
    ScanSummary,
    StatusMapper,
    SyncReport,
};
use cucumber::World;

#[derive(Debug, Default, World)]
pub struct CodWorld {
    /// Rows added by `Given` steps, loaded into the ledger on first use
    pub orders: Vec<Order>,
    ledger: Option<InMemoryLedger>,
    pub locator: StaticLocator,
    pub feed_pages: Vec<Vec<FeedOrder>>,
    pub feed_fails_from: Option<u32>,
    pub feed_calls: usize,
    pub worksheet: Vec<WorksheetRow>,
    pub now: Option<DateTime<Utc>>,
    pub report: Option<SyncReport>,
    pub summary: Option<ScanSummary>,
    pub error: Option<String>,
}

impl CodWorld {
    pub fn ledger(&mut self) -> InMemoryLedger {
        let orders = &self.orders;
        self.ledger.get_or_insert_with(|| InMemoryLedger::from_orders(orders.clone())).clone()
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.now.unwrap_or_else(Utc::now)
    }

    pub fn reconciliation_api(&mut self) -> ReconciliationApi<InMemoryLedger> {
        ReconciliationApi::new(self.ledger(), StatusMapper::default(), EventProducers::default())
    }

    pub fn fraud_api(&mut self) -> FraudScoringApi<InMemoryLedger, MemoryCache, StaticLocator> {
        let geo = GeolocationCache::new(MemoryCache::default(), self.locator.clone(), GeoCacheConfig::default());
        let mut config = FraudConfig::default();
        config.analysis.lookup_pause = std::time::Duration::ZERO;
        FraudScoringApi::new(self.ledger(), FraudScorer::new(geo, config), EventProducers::default())
    }

    pub fn feed(&self) -> MemoryFeed {
        let feed = MemoryFeed::paged(self.feed_pages.clone());
        match self.feed_fails_from {
            Some(page) => feed.failing_at(page),
            None => feed,
        }
    }

    pub fn report(&self) -> &SyncReport {
        self.report.as_ref().expect("No sync has run")
    }
}
