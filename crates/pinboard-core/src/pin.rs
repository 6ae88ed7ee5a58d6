//! Pin and coordinate types.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a pin.
pub type PinId = Uuid;

/// Address shown while the first geocode of a new pin is in flight.
pub const LOADING_ADDRESS: &str = "Loading address...";

/// Address shown while a moved pin is being geocoded again.
pub const UPDATING_ADDRESS: &str = "Updating address...";

/// A geographic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Clamp latitude to [-90, 90] and wrap longitude into [-180, 180].
    ///
    /// The map wraps horizontally, so a click past the antimeridian yields a
    /// longitude outside the valid range until it is normalized.
    pub fn normalized(self) -> Self {
        let lat = self.lat.clamp(-90.0, 90.0);
        let lng = if (-180.0..=180.0).contains(&self.lng) {
            self.lng
        } else {
            (self.lng + 180.0).rem_euclid(360.0) - 180.0
        };
        Self { lat, lng }
    }

    /// Check that both components are finite and inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Decimal representation with four fractional digits, e.g. `40.7128, -74.0060`.
    pub fn to_decimal_string(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}

/// A saved map location.
///
/// The serialized shape is `{ id, lat, lng, address, isGeocoding }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pin {
    pub id: PinId,
    pub lat: f64,
    pub lng: f64,
    pub address: String,
    pub is_geocoding: bool,
}

impl Pin {
    /// Create a pin that is waiting for its first address.
    pub fn new(position: LatLng) -> Self {
        let position = position.normalized();
        Self {
            id: Uuid::new_v4(),
            lat: position.lat,
            lng: position.lng,
            address: LOADING_ADDRESS.to_string(),
            is_geocoding: true,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }

    pub(crate) fn set_position(&mut self, position: LatLng) {
        let position = position.normalized();
        self.lat = position.lat;
        self.lng = position.lng;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_pin_is_geocoding() {
        let pin = Pin::new(LatLng::new(40.7128, -74.0060));
        assert!(pin.is_geocoding);
        assert_eq!(pin.address, LOADING_ADDRESS);
        assert_eq!(pin.position(), LatLng::new(40.7128, -74.0060));
    }

    #[test]
    fn test_normalize_wraps_longitude() {
        let p = LatLng::new(10.0, 190.0).normalized();
        assert!((p.lng - -170.0).abs() < 1e-9);

        let p = LatLng::new(10.0, -540.0).normalized();
        assert!((p.lng - -180.0).abs() < 1e-9);
        assert!(p.is_valid());
    }

    #[test]
    fn test_normalize_clamps_latitude() {
        let p = LatLng::new(95.0, 0.0).normalized();
        assert_eq!(p.lat, 90.0);
        let p = LatLng::new(-120.0, 0.0).normalized();
        assert_eq!(p.lat, -90.0);
    }

    #[test]
    fn test_invalid_coordinates() {
        assert!(!LatLng::new(f64::NAN, 0.0).is_valid());
        assert!(!LatLng::new(0.0, 181.0).is_valid());
        assert!(LatLng::new(-90.0, 180.0).is_valid());
    }

    #[test]
    fn test_decimal_string() {
        assert_eq!(LatLng::new(40.7128, -74.006).to_decimal_string(), "40.7128, -74.0060");
    }

    #[test]
    fn test_serialized_field_names() {
        let pin = Pin::new(LatLng::new(1.0, 2.0));
        let json = serde_json::to_value(&pin).unwrap();
        assert!(json.get("isGeocoding").is_some());
        assert!(json.get("lat").is_some());
        assert!(json.get("lng").is_some());
        assert!(json.get("address").is_some());
    }
}
