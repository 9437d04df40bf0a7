//! HTTP clients for the services the COD engine consults: the Dropea order-tracking feed and the ip-api.com
//! geolocation service. Each implements one of the engine's collaborator traits.
mod helpers;

pub mod dropea;
pub mod ip_api;

pub use dropea::{DropeaApi, DropeaApiError, DropeaConfig};
pub use ip_api::{IpApiConfig, IpApiError, IpApiLocator};
