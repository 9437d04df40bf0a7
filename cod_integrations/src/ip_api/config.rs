use std::time::Duration;

use cod_common::env_value_or;
use log::*;

pub const DEFAULT_GEO_API_URL: &str = "http://ip-api.com/json/";
pub const DEFAULT_GEO_FIELDS: &str = "status,message,country,regionName,region,city";
pub const DEFAULT_GEO_LANG: &str = "es";
pub const DEFAULT_GEO_TIMEOUT: Duration = Duration::from_millis(5_000);

#[derive(Debug, Clone)]
pub struct IpApiConfig {
    /// The IP is appended to this url
    pub base_url: String,
    pub fields: String,
    pub lang: String,
    pub timeout: Duration,
}

impl Default for IpApiConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_GEO_API_URL.to_string(),
            fields: DEFAULT_GEO_FIELDS.to_string(),
            lang: DEFAULT_GEO_LANG.to_string(),
            timeout: DEFAULT_GEO_TIMEOUT,
        }
    }
}

impl IpApiConfig {
    pub fn new_from_env_or_default() -> Self {
        let base_url = std::env::var("COD_GEO_API_URL").unwrap_or_else(|_| {
            debug!("🪛️ COD_GEO_API_URL not set, using {DEFAULT_GEO_API_URL}");
            DEFAULT_GEO_API_URL.to_string()
        });
        let fields = std::env::var("COD_GEO_FIELDS").unwrap_or_else(|_| DEFAULT_GEO_FIELDS.to_string());
        let lang = std::env::var("COD_GEO_LANG").unwrap_or_else(|_| DEFAULT_GEO_LANG.to_string());
        let timeout_ms = env_value_or("COD_GEO_TIMEOUT_MS", DEFAULT_GEO_TIMEOUT.as_millis() as u64);
        Self { base_url, fields, lang, timeout: Duration::from_millis(timeout_ms) }
    }
}
