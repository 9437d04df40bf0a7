use std::{future::Future, path::Path};

use anyhow::{anyhow, Result};
use cod_engine::{
    events::{EventHandlers, EventProducers},
    stats::{delivery_statistics, fraud_statistics, suspicious_ips},
    FraudScorer,
    FraudScoringApi,
    GeolocationCache,
    InMemoryLedger,
    MemoryCache,
    ReconciliationApi,
    ScoringMode,
    StatusMapper,
};
use cod_integrations::{DropeaApi, IpApiLocator};
use futures::future::join_all;
use log::*;

use crate::{
    audit::audit_hooks,
    config::CodConfig,
    formatting::*,
    ledger_file::{load_ledger, load_worksheet, save_ledger},
};

const EVENT_BUFFER_SIZE: usize = 16;

/// Runs `f` against the ledger file. The ledger is written back once `f` finishes, even if it failed, so that
/// changes applied before the failure are kept. Audit hooks are drained before returning.
async fn with_ledger<F, Fut, T>(config: &CodConfig, f: F) -> Result<T>
where
    F: FnOnce(InMemoryLedger, EventProducers) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let ledger = InMemoryLedger::from_orders(load_ledger(&config.ledger_path)?);
    let handlers = EventHandlers::new(EVENT_BUFFER_SIZE, audit_hooks(config.audit_log_path.as_deref()));
    let producers = handlers.producers();
    let handles = handlers.start_handlers();
    let result = f(ledger.clone(), producers).await;
    let saved = save_ledger(&config.ledger_path, &ledger.orders().await);
    for joined in join_all(handles).await {
        if let Err(e) = joined {
            warn!("📬️ An audit hook task failed. {e}");
        }
    }
    match (result, saved) {
        (Ok(value), Ok(())) => Ok(value),
        (Ok(_), Err(e)) => Err(e),
        (Err(e), Ok(())) => Err(e),
        (Err(e), Err(save_error)) => {
            error!("🗃️ The ledger could not be saved after a failed run. {save_error:#}");
            Err(e)
        },
    }
}

pub async fn sync_dropea(config: &CodConfig) -> Result<()> {
    let feed = DropeaApi::new(config.dropea.clone())?;
    let report = with_ledger(config, |ledger, producers| async move {
        let api = ReconciliationApi::new(ledger, StatusMapper::default(), producers)
            .with_max_pages(config.dropea.max_pages);
        Ok::<_, anyhow::Error>(api.sync_from_feed(&feed).await?)
    })
    .await?;
    println!("{}", format_sync_report(&report)?);
    Ok(())
}

pub async fn sync_worksheet(config: &CodConfig, path: Option<&Path>) -> Result<()> {
    let path = path
        .or(config.worksheet_path.as_deref())
        .ok_or_else(|| anyhow!("No worksheet given. Pass a path or set COD_WORKSHEET_PATH"))?;
    let rows = load_worksheet(path)?;
    let report = with_ledger(config, |ledger, producers| async move {
        let api = ReconciliationApi::new(ledger, StatusMapper::default(), producers);
        Ok::<_, anyhow::Error>(api.sync_from_worksheet(&rows).await?)
    })
    .await?;
    println!("{}", format_sync_report(&report)?);
    Ok(())
}

pub async fn pending(config: &CodConfig) -> Result<()> {
    let ledger = InMemoryLedger::from_orders(load_ledger(&config.ledger_path)?);
    let api = ReconciliationApi::new(ledger, StatusMapper::default(), EventProducers::default());
    let orders = api.fetch_pending_orders().await?;
    println!("{}", format_pending_orders(&orders));
    Ok(())
}

pub async fn fraud_scan(config: &CodConfig, all: bool, history: bool) -> Result<()> {
    let locator = IpApiLocator::new(config.ip_api.clone())?;
    let mode = if history { ScoringMode::WithHistory } else { ScoringMode::Standard };
    let summary = with_ledger(config, |ledger, producers| async move {
        let cache = MemoryCache::new(config.geo_cache_max_entries);
        let geo = GeolocationCache::new(cache, locator, config.geo_cache.clone());
        let api = FraudScoringApi::new(ledger, FraudScorer::new(geo, config.fraud.clone()), producers);
        let summary = api.scan(mode, all).await?;
        debug!("🛡️ {} locations cached during the scan", api.cached_locations().await.unwrap_or_default());
        Ok::<_, anyhow::Error>(summary)
    })
    .await?;
    println!("{}", format_scan_summary(&summary));
    Ok(())
}

pub fn fraud_stats(config: &CodConfig) -> Result<()> {
    let orders = load_ledger(&config.ledger_path)?;
    println!("{}", format_fraud_stats(&fraud_statistics(&orders)));
    Ok(())
}

pub fn fraud_ips(config: &CodConfig) -> Result<()> {
    let orders = load_ledger(&config.ledger_path)?;
    println!("{}", format_suspicious_ips(&suspicious_ips(&orders)));
    Ok(())
}

pub fn stats(config: &CodConfig) -> Result<()> {
    let orders = load_ledger(&config.ledger_path)?;
    println!("{}", format_delivery_stats(&delivery_statistics(&orders)));
    Ok(())
}

pub fn show_config(config: &CodConfig) {
    println!("{}", format_config(config));
}

pub async fn dropea_ping(config: &CodConfig) -> Result<()> {
    let api = DropeaApi::new(config.dropea.clone())?;
    let count = api.test_connection().await?;
    println!("✅ Connected to {}. {count} orders returned.", config.dropea.api_url);
    Ok(())
}
