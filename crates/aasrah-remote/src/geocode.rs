use aasrah_shared::{Coordinates, Geocoder, ServiceError};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::firebase::{check, invalid, network};

#[derive(Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Reverse geocoding against a Nominatim-compatible endpoint.
pub struct NominatimGeocoder {
    http: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }
}

fn address_of(body: ReverseResponse) -> Result<String, ServiceError> {
    match (body.display_name, body.error) {
        (Some(name), _) if !name.trim().is_empty() => Ok(name),
        (_, Some(error)) => Err(ServiceError::NotFound(error)),
        _ => Err(ServiceError::NotFound("No address for location".to_string())),
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn reverse(&self, at: Coordinates) -> Result<String, ServiceError> {
        let url = format!("{}/reverse", self.base_url.trim_end_matches('/'));
        let lat = at.lat.to_string();
        let lon = at.lng.to_string();
        let resp = self
            .http
            .get(url)
            .query(&[("format", "json"), ("lat", lat.as_str()), ("lon", lon.as_str())])
            .send()
            .await
            .map_err(network)?;
        let body: ReverseResponse = check(resp).await?.json().await.map_err(invalid)?;
        let address = address_of(body)?;
        debug!(%at, %address, "Reverse geocoded");
        Ok(address)
    }
}
