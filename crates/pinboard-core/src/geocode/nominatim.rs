//! Reverse geocoding against a Nominatim-compatible HTTP API.

use super::{BoxFuture, GeocodeError, GeocodeResult, Geocoder};
use crate::config::PinboardConfig;
use crate::pin::LatLng;
use serde::Deserialize;

/// The subset of a `/reverse?format=jsonv2` response we read.
#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
    error: Option<String>,
}

/// Extract the address from a reverse geocoding response body.
pub fn parse_reverse_response(body: &str) -> GeocodeResult<String> {
    let response: ReverseResponse =
        serde_json::from_str(body).map_err(|e| GeocodeError::Malformed(e.to_string()))?;

    if let Some(error) = response.error {
        return Err(GeocodeError::NoAddress(error));
    }

    match response.display_name {
        Some(name) if !name.trim().is_empty() => Ok(name.trim().to_string()),
        _ => Err(GeocodeError::Malformed("missing display_name".to_string())),
    }
}

fn query(position: LatLng) -> [(&'static str, String); 3] {
    [
        ("format", "jsonv2".to_string()),
        ("lat", position.lat.to_string()),
        ("lon", position.lng.to_string()),
    ]
}

/// Geocoder backed by Nominatim.
pub struct NominatimGeocoder {
    /// Full URL of the `/reverse` endpoint.
    url: String,
    #[cfg(not(target_arch = "wasm32"))]
    client: reqwest::blocking::Client,
    #[cfg(target_arch = "wasm32")]
    client: reqwest::Client,
}

impl NominatimGeocoder {
    /// Build a geocoder from the configured endpoint, user agent and timeout.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(config: &PinboardConfig) -> GeocodeResult<Self> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.geocode_timeout)
            .build()
            .map_err(|e| GeocodeError::Http(e.to_string()))?;
        Ok(Self {
            url: reverse_url(&config.geocoder_endpoint),
            client,
        })
    }

    /// Build a geocoder from the configured endpoint.
    ///
    /// Browsers own the User-Agent header and the request lifetime, so only
    /// the endpoint is taken from the config here.
    #[cfg(target_arch = "wasm32")]
    pub fn new(config: &PinboardConfig) -> GeocodeResult<Self> {
        Ok(Self {
            url: reverse_url(&config.geocoder_endpoint),
            client: reqwest::Client::new(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

fn reverse_url(endpoint: &str) -> String {
    format!("{}/reverse", endpoint.trim_end_matches('/'))
}

#[cfg(not(target_arch = "wasm32"))]
impl Geocoder for NominatimGeocoder {
    fn reverse(&self, position: LatLng) -> BoxFuture<'_, GeocodeResult<String>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.url)
                .query(&query(position))
                .send()
                .map_err(|e| GeocodeError::Http(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(GeocodeError::Status(status.as_u16()));
            }

            let body = response
                .text()
                .map_err(|e| GeocodeError::Http(e.to_string()))?;
            parse_reverse_response(&body)
        })
    }
}

#[cfg(target_arch = "wasm32")]
impl Geocoder for NominatimGeocoder {
    fn reverse(&self, position: LatLng) -> BoxFuture<'_, GeocodeResult<String>> {
        Box::pin(async move {
            let response = self
                .client
                .get(&self.url)
                .query(&query(position))
                .send()
                .await
                .map_err(|e| GeocodeError::Http(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                return Err(GeocodeError::Status(status.as_u16()));
            }

            let body = response
                .text()
                .await
                .map_err(|e| GeocodeError::Http(e.to_string()))?;
            parse_reverse_response(&body)
        })
    }
}
