use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum DropeaApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("No Dropea API key is configured. Set COD_DROPEA_API_KEY")]
    MissingApiKey,
    #[error("Request to Dropea failed: {0}")]
    RequestError(String),
    #[error("Query failed. Error {status}. {message}")]
    QueryError { status: u16, message: String },
    #[error("Could not deserialize JSON: {0}")]
    JsonError(String),
    #[error("Invalid GraphQL query: {0}")]
    InvalidGraphQL(String),
    #[error("GraphQL query failed: {0}")]
    GraphQLError(String),
    #[error("Dropea returned an empty response")]
    EmptyResponse,
}
