//! Starting-view overrides read from `lat`, `lng` and `zoom` URL parameters.

use pinboard_core::LatLng;

/// Initial map view requested by the page URL.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewParams {
    pub center: Option<LatLng>,
    pub zoom: Option<f64>,
}

impl ViewParams {
    /// Fill fields that are still unset from `other`.
    pub fn or(self, other: ViewParams) -> ViewParams {
        ViewParams {
            center: self.center.or(other.center),
            zoom: self.zoom.or(other.zoom),
        }
    }
}

/// Parse `lat`, `lng` and `zoom` from a query string or hash fragment.
///
/// A center is only produced when both coordinates parse and are in range.
pub fn parse_view_params(s: &str) -> ViewParams {
    let s = s.trim_start_matches(['?', '#']);

    let mut lat = None;
    let mut lng = None;
    let mut zoom = None;

    for pair in s.split('&') {
        let Some((key, value)) = pair.split_once('=') else {
            continue;
        };
        let Ok(value) = value.trim().parse::<f64>() else {
            continue;
        };
        if !value.is_finite() {
            continue;
        }
        match key {
            "lat" => lat = Some(value),
            "lng" | "lon" => lng = Some(value),
            "zoom" | "z" => zoom = Some(value),
            _ => {}
        }
    }

    let center = match (lat, lng) {
        (Some(lat), Some(lng)) => Some(LatLng::new(lat, lng)).filter(LatLng::is_valid),
        _ => None,
    };

    ViewParams { center, zoom }
}
