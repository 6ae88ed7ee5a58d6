//! Reverse geocoding: turning coordinates into an address.

mod nominatim;
mod worker;

pub use nominatim::{NominatimGeocoder, parse_reverse_response};
pub use worker::{GeocodeWorker, SharedGeocoder};

use crate::pin::LatLng;
use std::future::Future;
use std::pin::Pin;
use thiserror::Error;

/// Address used whenever a lookup fails or never finishes.
pub const FALLBACK_ADDRESS: &str = "Address unavailable";

/// Geocoding errors.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("HTTP error: {0}")]
    Http(String),
    #[error("Geocoder returned status {0}")]
    Status(u16),
    #[error("Malformed response: {0}")]
    Malformed(String),
    #[error("No address for this location: {0}")]
    NoAddress(String),
    #[error("Geocode worker unavailable")]
    Worker,
}

/// Result type for geocoding operations.
pub type GeocodeResult<T> = Result<T, GeocodeError>;

/// Boxed future for async operations (compatible with WASM).
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + 'a>>;

/// A reverse geocoding backend.
///
/// Note: On native platforms, implementations must be Send + Sync since they
/// run on the geocode worker thread.
#[cfg(not(target_arch = "wasm32"))]
pub trait Geocoder: Send + Sync {
    /// Look up a human-readable address for a position.
    fn reverse(&self, position: LatLng) -> BoxFuture<'_, GeocodeResult<String>>;
}

/// A reverse geocoding backend (WASM version without Send + Sync).
#[cfg(target_arch = "wasm32")]
pub trait Geocoder {
    /// Look up a human-readable address for a position.
    fn reverse(&self, position: LatLng) -> BoxFuture<'_, GeocodeResult<String>>;
}

/// Resolve a position to an address, substituting [`FALLBACK_ADDRESS`] on any error.
pub async fn resolve<G: Geocoder + ?Sized>(geocoder: &G, position: LatLng) -> String {
    match geocoder.reverse(position).await {
        Ok(address) => address,
        Err(e) => {
            log::warn!(
                "Reverse geocode failed for {}: {}",
                position.to_decimal_string(),
                e
            );
            FALLBACK_ADDRESS.to_string()
        }
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    /// Answers every lookup from its coordinates, or fails for southern positions.
    pub struct FakeGeocoder;

    impl Geocoder for FakeGeocoder {
        fn reverse(&self, position: LatLng) -> BoxFuture<'_, GeocodeResult<String>> {
            Box::pin(async move {
                if position.lat < 0.0 {
                    Err(GeocodeError::Http("connection refused".to_string()))
                } else {
                    Ok(format!("Near {}", position.to_decimal_string()))
                }
            })
        }
    }
}
