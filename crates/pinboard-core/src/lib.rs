//! Map Pinboard Core Library
//!
//! Platform-agnostic pin state, geocoding, persistence, and map math for the
//! Map Pinboard.

pub mod board;
pub mod camera;
pub mod config;
pub mod coords;
pub mod geocode;
pub mod highlight;
pub mod input;
pub mod markers;
pub mod pin;
pub mod storage;
pub mod store;

pub use board::PinBoard;
pub use camera::MapCamera;
pub use config::PinboardConfig;
pub use coords::{format_latitude, format_longitude, format_position};
pub use geocode::{FALLBACK_ADDRESS, GeocodeWorker, Geocoder, NominatimGeocoder};
pub use highlight::{HighlightState, HoverTransition, MarkerStyle};
pub use input::{Gesture, PointerEvent, PointerKind, PointerTracker};
pub use markers::{Marker, MarkerDiff, MarkerLayer};
pub use pin::{LOADING_ADDRESS, LatLng, Pin, PinId, UPDATING_ADDRESS};
pub use storage::{PlatformStorage, Storage, create_default_storage};
pub use store::{ApplyOutcome, GeocodeCompletion, GeocodeRequest, PinStore};
