//! Runtime configuration for the pinboard core.

use crate::pin::LatLng;
use std::time::Duration;

/// Storage key holding the serialized pin list.
pub const DEFAULT_STORAGE_KEY: &str = "map-pinboard-pins";
pub const DEFAULT_GEOCODER_ENDPOINT: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_GEOCODE_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_CENTER: LatLng = LatLng::new(-37.8136, 144.9631);
pub const DEFAULT_ZOOM: f64 = 11.0;

#[derive(Debug, Clone, PartialEq)]
pub struct PinboardConfig {
    pub storage_key: String,
    /// Base URL of a Nominatim-compatible service.
    pub geocoder_endpoint: String,
    pub user_agent: String,
    /// Lookups outstanding longer than this resolve to the fallback address.
    pub geocode_timeout: Duration,
    pub initial_center: LatLng,
    pub initial_zoom: f64,
}

impl Default for PinboardConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            geocoder_endpoint: DEFAULT_GEOCODER_ENDPOINT.to_string(),
            user_agent: concat!("map-pinboard/", env!("CARGO_PKG_VERSION")).to_string(),
            geocode_timeout: Duration::from_secs(DEFAULT_GEOCODE_TIMEOUT_SECS),
            initial_center: DEFAULT_CENTER,
            initial_zoom: DEFAULT_ZOOM,
        }
    }
}

impl PinboardConfig {
    /// Defaults overridden by `PINBOARD_*` environment variables.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Apply overrides from any name -> value source. Bad values are logged and skipped.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(url) = lookup("PINBOARD_GEOCODER_URL") {
            let url = url.trim();
            if url.starts_with("http://") || url.starts_with("https://") {
                config.geocoder_endpoint = url.to_string();
            } else {
                log::warn!("Ignoring PINBOARD_GEOCODER_URL={:?}: not an http(s) URL", url);
            }
        }

        if let Some(secs) = lookup("PINBOARD_GEOCODE_TIMEOUT_SECS") {
            match secs.trim().parse::<u64>() {
                Ok(secs) if secs > 0 => config.geocode_timeout = Duration::from_secs(secs),
                _ => log::warn!("Ignoring PINBOARD_GEOCODE_TIMEOUT_SECS={:?}", secs),
            }
        }

        if let Some(key) = lookup("PINBOARD_STORAGE_KEY") {
            if key.trim().is_empty() {
                log::warn!("Ignoring empty PINBOARD_STORAGE_KEY");
            } else {
                config.storage_key = key.trim().to_string();
            }
        }

        config
    }

    /// Override the starting view, ignoring invalid values.
    pub fn with_initial_view(mut self, center: Option<LatLng>, zoom: Option<f64>) -> Self {
        if let Some(center) = center.filter(LatLng::is_valid) {
            self.initial_center = center;
        }
        if let Some(zoom) = zoom.filter(|z| z.is_finite()) {
            self.initial_zoom = zoom;
        }
        self
    }
}
