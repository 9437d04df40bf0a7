use std::sync::Arc;

use cod_engine::sync::{FeedPage, OrderFeed};
use graphql_parser::parse_query;
use log::*;
use reqwest::{
    header::{HeaderMap, HeaderValue},
    Client,
};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::Value;
use url::Url;

use crate::dropea::{DropeaApiError, DropeaConfig, DropeaOrders};

pub const CONNECTION_TEST_QUERY: &str = "query { orders(limit: 1) { data { id status } } }";

const ORDER_FIELDS: &str = "data { id status external_order_id tracking_code created_at } pagination { page totalPages }";

/// The newest-first orders query for one page.
pub fn orders_query(page: u32, page_size: u32) -> String {
    format!(
        "query {{ orders(sort: CREATED_AT, direction: DESC, limit: {page_size}, page: {page}) {{ {ORDER_FIELDS} }} }}"
    )
}

/// Extracts page `requested` from the JSON body of an orders query.
pub fn parse_orders_response(body: Value, requested: u32) -> Result<FeedPage, DropeaApiError> {
    #[derive(Deserialize)]
    struct OrdersResponse {
        orders: Option<DropeaOrders>,
    }
    let data = graphql_data(body)?;
    let response = serde_json::from_value::<OrdersResponse>(data).map_err(|e| DropeaApiError::JsonError(e.to_string()))?;
    let orders = response.orders.ok_or(DropeaApiError::EmptyResponse)?;
    Ok(orders.into_feed_page(requested))
}

fn graphql_data(body: Value) -> Result<Value, DropeaApiError> {
    if let Some(errors) = body["errors"].as_array() {
        if !errors.is_empty() {
            let e = errors.iter().map(|e| e.to_string()).collect::<Vec<String>>().join(", ");
            return Err(DropeaApiError::GraphQLError(e));
        }
    }
    let data = body["data"].clone();
    if data.is_null() {
        return Err(DropeaApiError::EmptyResponse);
    }
    Ok(data)
}

#[derive(Debug, Clone)]
pub struct DropeaApi {
    config: DropeaConfig,
    url: Url,
    client: Arc<Client>,
}

impl DropeaApi {
    pub fn new(config: DropeaConfig) -> Result<Self, DropeaApiError> {
        if config.api_key.is_empty() {
            return Err(DropeaApiError::MissingApiKey);
        }
        let url = Url::parse(&config.api_url)
            .map_err(|e| DropeaApiError::Initialization(format!("Invalid API url {}. {e}", config.api_url)))?;
        let mut headers = HeaderMap::with_capacity(2);
        let val = HeaderValue::from_str(config.api_key.reveal().as_str())
            .map_err(|e| DropeaApiError::Initialization(e.to_string()))?;
        headers.insert("x-api-key", val);
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| DropeaApiError::Initialization(e.to_string()))?;
        Ok(Self { config, url, client: Arc::new(client) })
    }

    pub fn config(&self) -> &DropeaConfig {
        &self.config
    }

    async fn post_query(&self, query: &str) -> Result<Value, DropeaApiError> {
        let query = parse_query::<String>(query).map_err(|e| DropeaApiError::InvalidGraphQL(e.to_string()))?;
        let body = serde_json::json!({ "query": query.to_string() });
        trace!("📡️ Sending GraphQL query: {body}");
        let response = self
            .client
            .post(self.url.clone())
            .json(&body)
            .send()
            .await
            .map_err(|e| DropeaApiError::RequestError(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(DropeaApiError::QueryError { status: status.as_u16(), message });
        }
        response.json::<Value>().await.map_err(|e| DropeaApiError::JsonError(e.to_string()))
    }

    pub async fn graphql_query<T: DeserializeOwned>(&self, query: &str) -> Result<T, DropeaApiError> {
        let data = graphql_data(self.post_query(query).await?)?;
        trace!("📡️ GraphQL response: {data}");
        serde_json::from_value(data).map_err(|e| DropeaApiError::JsonError(e.to_string()))
    }

    /// Fetches one page (1-based) of orders, newest first.
    pub async fn fetch_orders_page(&self, page: u32) -> Result<FeedPage, DropeaApiError> {
        debug!("📡️ Fetching Dropea orders page {page}");
        let body = self.post_query(&orders_query(page, self.config.page_size)).await?;
        let page = parse_orders_response(body, page)?;
        debug!("📡️ Page {}/{} has {} orders", page.page, page.total_pages, page.orders.len());
        Ok(page)
    }

    /// Runs a one-order query and returns the number of orders it got back.
    pub async fn test_connection(&self) -> Result<usize, DropeaApiError> {
        let result = self.graphql_query::<Value>(CONNECTION_TEST_QUERY).await?;
        let count = result["orders"]["data"].as_array().map(Vec::len).unwrap_or_default();
        info!("📡️ Connected to Dropea at {}", self.url);
        Ok(count)
    }
}

impl OrderFeed for DropeaApi {
    type Error = DropeaApiError;

    async fn fetch_page(&self, page: u32) -> Result<FeedPage, Self::Error> {
        self.fetch_orders_page(page).await
    }
}
