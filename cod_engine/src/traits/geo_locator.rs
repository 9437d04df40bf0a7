use thiserror::Error;

use crate::traits::GeoResult;

#[derive(Debug, Clone, Error)]
pub enum GeoLookupError {
    #[error("Geolocation request failed: {0}")]
    Transport(String),
    #[error("Geolocation request timed out")]
    Timeout,
    #[error("Could not interpret the geolocation response: {0}")]
    InvalidResponse(String),
}

/// Resolves an IP address to a location.
///
/// An IP that the service cannot place is *not* an error: implementations return a [`GeoResult`] whose status is not
/// `success`. Errors are reserved for failures to get an answer at all.
#[allow(async_fn_in_trait)]
pub trait GeoLocator {
    async fn locate(&self, ip: &str) -> Result<GeoResult, GeoLookupError>;
}
