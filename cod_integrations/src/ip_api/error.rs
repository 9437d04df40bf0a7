use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum IpApiError {
    #[error("Could not initialize client: {0}")]
    Initialization(String),
    #[error("Invalid geolocation url: {0}")]
    InvalidUrl(String),
}
