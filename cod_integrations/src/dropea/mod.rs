//! Client for the Dropea dropshipping GraphQL API, which reports the carrier status of every shipped order.
mod api;
mod config;
mod data_objects;
mod error;

pub use api::{orders_query, parse_orders_response, DropeaApi, CONNECTION_TEST_QUERY};
pub use config::{DropeaConfig, DEFAULT_DROPEA_API_URL, DEFAULT_PAGE_SIZE};
pub use data_objects::{DropeaOrder, DropeaOrders, Pagination};
pub use error::DropeaApiError;
