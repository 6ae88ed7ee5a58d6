//! Degrees/minutes/seconds formatting.

use crate::pin::LatLng;

/// Tenths of an arcsecond per degree.
const TENTHS_PER_DEGREE: f64 = 36_000.0;

/// Which axis a value belongs to; selects the cardinal suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Latitude,
    Longitude,
}

impl Axis {
    fn suffix(self, negative: bool) -> char {
        match (self, negative) {
            (Axis::Latitude, false) => 'N',
            (Axis::Latitude, true) => 'S',
            (Axis::Longitude, false) => 'E',
            (Axis::Longitude, true) => 'W',
        }
    }
}

/// Format decimal degrees as `D°M'S.s"X`, seconds rounded to one decimal.
///
/// Rounding is done once on the total number of tenths of an arcsecond, so a
/// value like 10.99999 carries into `11°0'0.0"` instead of printing 60 seconds.
pub fn to_dms(value: f64, axis: Axis) -> String {
    let negative = value < 0.0;
    let total = (value.abs() * TENTHS_PER_DEGREE).round() as u64;

    let degrees = total / 36_000;
    let minutes = (total % 36_000) / 600;
    let tenths = total % 600;

    format!(
        "{}°{}'{}.{}\"{}",
        degrees,
        minutes,
        tenths / 10,
        tenths % 10,
        axis.suffix(negative && total > 0)
    )
}

/// Format a latitude, e.g. `40°42'46.1"N`.
pub fn format_latitude(lat: f64) -> String {
    to_dms(lat, Axis::Latitude)
}

/// Format a longitude, e.g. `74°0'21.6"W`.
pub fn format_longitude(lng: f64) -> String {
    to_dms(lng, Axis::Longitude)
}

/// Both components, latitude first.
pub fn format_position(position: LatLng) -> String {
    format!(
        "{}, {}",
        format_latitude(position.lat),
        format_longitude(position.lng)
    )
}
