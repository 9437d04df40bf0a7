use std::sync::Arc;

use cod_engine::traits::{GeoLocator, GeoLookupError, GeoResult};
use log::*;
use reqwest::Client;
use url::Url;

use crate::ip_api::{IpApiConfig, IpApiError};

/// Parses an ip-api.com response body.
pub fn parse_geo_response(body: &str) -> Result<GeoResult, GeoLookupError> {
    serde_json::from_str::<GeoResult>(body).map_err(|e| GeoLookupError::InvalidResponse(e.to_string()))
}

#[derive(Clone)]
pub struct IpApiLocator {
    config: IpApiConfig,
    base_url: Url,
    client: Arc<Client>,
}

impl IpApiLocator {
    pub fn new(config: IpApiConfig) -> Result<Self, IpApiError> {
        let base = format!("{}/", config.base_url.trim_end_matches('/'));
        let base_url = Url::parse(&base).map_err(|e| IpApiError::InvalidUrl(format!("{}. {e}", config.base_url)))?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| IpApiError::Initialization(e.to_string()))?;
        Ok(Self { config, base_url, client: Arc::new(client) })
    }

    pub fn config(&self) -> &IpApiConfig {
        &self.config
    }

    /// `<base>/<ip>?fields=..&lang=..`
    pub fn lookup_url(&self, ip: &str) -> Result<Url, GeoLookupError> {
        let mut url = self.base_url.join(ip.trim()).map_err(|e| GeoLookupError::Transport(e.to_string()))?;
        url.query_pairs_mut().append_pair("fields", &self.config.fields).append_pair("lang", &self.config.lang);
        Ok(url)
    }
}

impl GeoLocator for IpApiLocator {
    async fn locate(&self, ip: &str) -> Result<GeoResult, GeoLookupError> {
        let url = self.lookup_url(ip)?;
        trace!("🌍️ GET {url}");
        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                GeoLookupError::Timeout
            } else {
                GeoLookupError::Transport(e.to_string())
            }
        })?;
        let status = response.status();
        let body = response.text().await.map_err(|e| GeoLookupError::Transport(e.to_string()))?;
        if !status.is_success() {
            warn!("🌍️ Geolocation service answered {status} for {ip}");
            return Err(GeoLookupError::Transport(format!("HTTP {}: {body}", status.as_u16())));
        }
        let result = parse_geo_response(&body)?;
        debug!("🌍️ {ip} is in {:?}, {:?} ({})", result.city, result.region_name, result.status);
        Ok(result)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn builds_lookup_urls() {
        let locator = IpApiLocator::new(IpApiConfig::default()).unwrap();
        let url = locator.lookup_url(" 83.45.12.9 ").unwrap();
        assert_eq!(
            url.as_str(),
            "http://ip-api.com/json/83.45.12.9?fields=status%2Cmessage%2Ccountry%2CregionName%2Cregion%2Ccity&lang=es"
        );
        let config = IpApiConfig { base_url: "https://pro.ip-api.com/json".into(), ..Default::default() };
        let url = IpApiLocator::new(config).unwrap().lookup_url("1.2.3.4").unwrap();
        assert!(url.as_str().starts_with("https://pro.ip-api.com/json/1.2.3.4?"));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_transport_error() {
        let _ = env_logger::try_init();
        let config = IpApiConfig { base_url: "http://127.0.0.1:9/json".into(), ..Default::default() };
        let locator = IpApiLocator::new(config).unwrap();
        let err = locator.locate("1.2.3.4").await.unwrap_err();
        assert!(matches!(err, GeoLookupError::Transport(_) | GeoLookupError::Timeout), "{err}");
    }

    #[test]
    fn rejects_invalid_base_urls() {
        let config = IpApiConfig { base_url: "ip-api".into(), ..Default::default() };
        assert!(matches!(IpApiLocator::new(config), Err(IpApiError::InvalidUrl(_))));
    }
}
