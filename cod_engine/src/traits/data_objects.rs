use serde::{Deserialize, Serialize};

pub const GEO_SUCCESS: &str = "success";

/// The answer from a geolocation lookup. Field names follow the ip-api.com JSON payload, which is also what the
/// geolocation cache stores.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoResult {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, rename = "regionName", skip_serializing_if = "Option::is_none")]
    pub region_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl GeoResult {
    pub fn success<S: Into<String>>(country: S, region_name: S, city: S) -> Self {
        Self {
            status: GEO_SUCCESS.to_string(),
            country: Some(country.into()),
            region_name: Some(region_name.into()),
            city: Some(city.into()),
            ..Default::default()
        }
    }

    pub fn fail<S: Into<String>>(message: S) -> Self {
        Self { status: "fail".to_string(), message: Some(message.into()), ..Default::default() }
    }

    pub fn is_success(&self) -> bool {
        self.status == GEO_SUCCESS
    }
}
