use std::path::PathBuf;

use chrono_tz::Tz;
use cod_common::env_value_or;
use cod_engine::{fraud::FraudConfig, memory::DEFAULT_MAX_ENTRIES, GeoCacheConfig};
use cod_integrations::{DropeaConfig, IpApiConfig};
use log::*;

pub const DEFAULT_LEDGER_PATH: &str = "orders.json";

/// Everything `codtools` needs, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct CodConfig {
    pub ledger_path: PathBuf,
    pub worksheet_path: Option<PathBuf>,
    /// Audit events are appended here as JSON lines, if set
    pub audit_log_path: Option<PathBuf>,
    pub fraud: FraudConfig,
    pub geo_cache: GeoCacheConfig,
    pub geo_cache_max_entries: usize,
    pub dropea: DropeaConfig,
    pub ip_api: IpApiConfig,
}

impl Default for CodConfig {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            worksheet_path: None,
            audit_log_path: None,
            fraud: FraudConfig::default(),
            geo_cache: GeoCacheConfig::default(),
            geo_cache_max_entries: DEFAULT_MAX_ENTRIES,
            dropea: DropeaConfig::default(),
            ip_api: IpApiConfig::default(),
        }
    }
}

fn optional_path(name: &str) -> Option<PathBuf> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty()).map(PathBuf::from)
}

impl CodConfig {
    pub fn from_env_or_default() -> Self {
        let defaults = Self::default();
        let ledger_path = optional_path("COD_LEDGER_PATH").unwrap_or_else(|| {
            debug!("🪛️ COD_LEDGER_PATH not set, using {DEFAULT_LEDGER_PATH}");
            defaults.ledger_path.clone()
        });
        let mut fraud = FraudConfig::default();
        let analysis = &mut fraud.analysis;
        let window_hours = env_value_or("COD_REPEAT_WINDOW_HOURS", analysis.repeat_window.num_hours());
        analysis.repeat_window = chrono::Duration::hours(window_hours);
        analysis.max_addresses_per_ip = env_value_or("COD_MAX_ADDRESSES_PER_IP", analysis.max_addresses_per_ip);
        let pause_ms = env_value_or("COD_LOOKUP_PAUSE_MS", analysis.lookup_pause.as_millis() as u64);
        analysis.lookup_pause = std::time::Duration::from_millis(pause_ms);
        analysis.timezone = timezone_from_env(analysis.timezone);
        let history = &mut fraud.history;
        history.lookback_days = env_value_or("COD_HISTORY_DAYS", history.lookback_days);
        history.repeat_threshold = env_value_or("COD_HISTORY_REPEATS", history.repeat_threshold);
        history.bonus_points = env_value_or("COD_HISTORY_BONUS", history.bonus_points);
        let ttl = env_value_or("COD_GEO_CACHE_TTL_SECS", defaults.geo_cache.ttl.as_secs());
        Self {
            ledger_path,
            worksheet_path: optional_path("COD_WORKSHEET_PATH"),
            audit_log_path: optional_path("COD_AUDIT_LOG_PATH"),
            fraud: checked_fraud_config(fraud),
            geo_cache: GeoCacheConfig { ttl: std::time::Duration::from_secs(ttl) },
            geo_cache_max_entries: env_value_or("COD_GEO_CACHE_MAX_ENTRIES", DEFAULT_MAX_ENTRIES),
            dropea: DropeaConfig::new_from_env_or_default(),
            ip_api: IpApiConfig::new_from_env_or_default(),
        }
    }
}

fn timezone_from_env(default: Tz) -> Tz {
    match std::env::var("COD_TIMEZONE") {
        Ok(name) => name.parse::<Tz>().unwrap_or_else(|e| {
            warn!("🪛️ Invalid COD_TIMEZONE '{name}'. Using {default}. {e}");
            default
        }),
        Err(_) => default,
    }
}

/// `candidate` if it is consistent, the defaults otherwise.
pub fn checked_fraud_config(candidate: FraudConfig) -> FraudConfig {
    match candidate.validate() {
        Ok(()) => candidate,
        Err(e) => {
            warn!("🪛️ Invalid fraud scoring configuration. Using the defaults. {e}");
            FraudConfig::default()
        },
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn invalid_fraud_settings_fall_back_to_defaults() {
        let mut config = FraudConfig::default();
        config.analysis.max_addresses_per_ip = 1;
        config.analysis.lookup_pause = std::time::Duration::ZERO;
        let checked = checked_fraud_config(config);
        assert_eq!(checked.analysis, FraudConfig::default().analysis);

        let mut config = FraudConfig::default();
        config.history.lookback_days = 60;
        assert_eq!(checked_fraud_config(config).history.lookback_days, 60);
    }

    #[test]
    fn defaults() {
        let config = CodConfig::default();
        assert_eq!(config.ledger_path, PathBuf::from("orders.json"));
        assert_eq!(config.geo_cache_max_entries, 1000);
        assert_eq!(config.geo_cache.ttl.as_secs(), 86_400);
        assert!(config.audit_log_path.is_none());
    }
}
