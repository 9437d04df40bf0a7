use cod_common::{env_value_or, Secret};
use cod_engine::sync::DEFAULT_MAX_PAGES;
use log::*;

pub const DEFAULT_DROPEA_API_URL: &str = "https://api.dropea.com/graphql/dropshippers";
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone)]
pub struct DropeaConfig {
    pub api_url: String,
    pub api_key: Secret<String>,
    /// Orders requested per page
    pub page_size: u32,
    /// Most pages a single sync will fetch
    pub max_pages: u32,
}

impl Default for DropeaConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_DROPEA_API_URL.to_string(),
            api_key: Secret::default(),
            page_size: DEFAULT_PAGE_SIZE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }
}

impl DropeaConfig {
    pub fn new_from_env_or_default() -> Self {
        let api_url = std::env::var("COD_DROPEA_API_URL").unwrap_or_else(|_| {
            debug!("🪛️ COD_DROPEA_API_URL not set, using {DEFAULT_DROPEA_API_URL}");
            DEFAULT_DROPEA_API_URL.to_string()
        });
        let api_key = Secret::new(std::env::var("COD_DROPEA_API_KEY").unwrap_or_else(|_| {
            warn!("🪛️ COD_DROPEA_API_KEY not set. Requests to Dropea will fail.");
            String::default()
        }));
        let page_size = match env_value_or("COD_DROPEA_PAGE_SIZE", DEFAULT_PAGE_SIZE) {
            0 => {
                warn!("🪛️ COD_DROPEA_PAGE_SIZE cannot be 0. Using {DEFAULT_PAGE_SIZE}");
                DEFAULT_PAGE_SIZE
            },
            n => n,
        };
        let max_pages = env_value_or("COD_DROPEA_MAX_PAGES", DEFAULT_MAX_PAGES);
        Self { api_url, api_key, page_size, max_pages }
    }
}
