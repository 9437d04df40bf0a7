//! [`GeoLocator`](cod_engine::traits::GeoLocator) backed by the free ip-api.com JSON endpoint.
mod api;
mod config;
mod error;

pub use api::{parse_geo_response, IpApiLocator};
pub use config::{IpApiConfig, DEFAULT_GEO_API_URL, DEFAULT_GEO_FIELDS, DEFAULT_GEO_LANG, DEFAULT_GEO_TIMEOUT};
pub use error::IpApiError;
