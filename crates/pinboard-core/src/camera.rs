//! Web Mercator map camera: projection, pan/zoom, and animated recentering.
//!
//! All screen coordinates are logical pixels with the origin at the top-left
//! of the map viewport. The world is a 256 px tile at zoom 0, doubling per
//! zoom level.

use crate::pin::LatLng;
use kurbo::{Point, Size, Vec2};
use std::f64::consts::PI;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

/// Edge length of one tile in logical pixels.
pub const TILE_SIZE: f64 = 256.0;
pub const MIN_ZOOM: f64 = 2.0;
pub const MAX_ZOOM: f64 = 19.0;
/// Latitude where Web Mercator becomes square.
pub const MAX_LATITUDE: f64 = 85.051_128_78;
/// Duration of the smooth recentering animation.
pub const PAN_DURATION: Duration = Duration::from_millis(300);

/// Degree steps the graticule may use, finest first.
const GRID_STEPS: [f64; 14] = [
    0.001, 0.002, 0.005, 0.01, 0.02, 0.05, 0.1, 0.2, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0,
];
/// Minimum spacing between graticule lines in logical pixels.
const GRID_MIN_SPACING: f64 = 100.0;

/// Project onto the unit square (x east, y south).
pub fn project(position: LatLng) -> Point {
    let lat = position.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
    let x = (position.lng + 180.0) / 360.0;
    let y = (1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0;
    Point::new(x, y)
}

/// Inverse of [`project`]. Longitude is not wrapped.
pub fn unproject(point: Point) -> LatLng {
    let lng = point.x * 360.0 - 180.0;
    let n = PI * (1.0 - 2.0 * point.y);
    let lat = n.sinh().atan().to_degrees();
    LatLng::new(lat, lng)
}

/// Wrap a unit-square x difference into [-0.5, 0.5].
fn shortest_dx(dx: f64) -> f64 {
    (dx + 0.5).rem_euclid(1.0) - 0.5
}

fn ease_out_cubic(t: f64) -> f64 {
    1.0 - (1.0 - t).powi(3)
}

#[derive(Debug, Clone, Copy)]
struct PanAnimation {
    from: Point,
    /// Unwrapped so the animation takes the short way around.
    to: Point,
    start: Instant,
}

#[derive(Debug, Clone)]
pub struct MapCamera {
    /// Center in unit-square coordinates.
    center: Point,
    zoom: f64,
    viewport: Size,
    animation: Option<PanAnimation>,
}

impl MapCamera {
    pub fn new(center: LatLng, zoom: f64) -> Self {
        Self {
            center: project(center.normalized()),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            viewport: Size::new(800.0, 600.0),
            animation: None,
        }
    }

    pub fn center(&self) -> LatLng {
        unproject(self.center).normalized()
    }

    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    pub fn viewport(&self) -> Size {
        self.viewport
    }

    /// Resize the viewport; the center stays put.
    pub fn set_viewport(&mut self, size: Size) {
        self.viewport = Size::new(size.width.max(1.0), size.height.max(1.0));
    }

    /// World edge length in pixels at the current zoom.
    pub fn world_size(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    fn viewport_center(&self) -> Point {
        Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0)
    }

    /// Screen position of a coordinate, using the world copy nearest the center.
    pub fn latlng_to_screen(&self, position: LatLng) -> Point {
        let p = project(position);
        let ws = self.world_size();
        let dx = shortest_dx(p.x - self.center.x);
        let dy = p.y - self.center.y;
        self.viewport_center() + Vec2::new(dx * ws, dy * ws)
    }

    /// Coordinate under a screen point, normalized.
    pub fn screen_to_latlng(&self, point: Point) -> LatLng {
        let ws = self.world_size();
        let offset = (point - self.viewport_center()) / ws;
        unproject(self.center + offset).normalized()
    }

    /// Move the map content by `delta` screen pixels. Cancels any animation.
    pub fn pan(&mut self, delta: Vec2) {
        self.animation = None;
        let ws = self.world_size();
        self.set_center_unit(self.center - delta / ws);
    }

    /// Change zoom by `delta` levels, keeping the coordinate under `anchor` fixed.
    pub fn zoom_at(&mut self, anchor: Point, delta: f64) {
        let zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);
        if (zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }
        let ws = self.world_size();
        let under = self.center + (anchor - self.viewport_center()) / ws;

        self.zoom = zoom;
        let ws = self.world_size();
        self.set_center_unit(under - (anchor - self.viewport_center()) / ws);

        // Keep animating toward the same target at the new scale.
        if let Some(animation) = &mut self.animation {
            animation.from = self.center;
        }
    }

    /// Zoom around the viewport center.
    pub fn zoom_by(&mut self, delta: f64) {
        self.zoom_at(self.viewport_center(), delta);
    }

    /// Jump to a coordinate without animating.
    pub fn set_center(&mut self, position: LatLng) {
        self.animation = None;
        self.set_center_unit(project(position.normalized()));
    }

    /// Start a smooth recenter on `target`, keeping the zoom level.
    pub fn pan_to(&mut self, target: LatLng, now: Instant) {
        let to = project(target.normalized());
        let to = Point::new(self.center.x + shortest_dx(to.x - self.center.x), to.y);
        if (to - self.center).hypot() * self.world_size() < 0.5 {
            self.animation = None;
            return;
        }
        self.animation = Some(PanAnimation {
            from: self.center,
            to,
            start: now,
        });
    }

    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Advance the recenter animation. Returns true while still animating.
    pub fn tick(&mut self, now: Instant) -> bool {
        let Some(animation) = self.animation else {
            return false;
        };
        let elapsed = now.saturating_duration_since(animation.start);
        let t = (elapsed.as_secs_f64() / PAN_DURATION.as_secs_f64()).min(1.0);
        let eased = ease_out_cubic(t);
        self.set_center_unit(animation.from.lerp(animation.to, eased));
        if t >= 1.0 {
            self.animation = None;
            false
        } else {
            true
        }
    }

    fn set_center_unit(&mut self, center: Point) {
        self.center = Point::new(center.x.rem_euclid(1.0), center.y.clamp(0.0, 1.0));
    }

    /// South-west and north-east corners of the visible area.
    ///
    /// Longitudes are left unwrapped so the span stays contiguous.
    pub fn visible_bounds(&self) -> (LatLng, LatLng) {
        let ws = self.world_size();
        let half = Vec2::new(self.viewport.width, self.viewport.height) / (2.0 * ws);
        let nw = unproject(Point::new(self.center.x - half.x, (self.center.y - half.y).max(0.0)));
        let se = unproject(Point::new(self.center.x + half.x, (self.center.y + half.y).min(1.0)));
        (LatLng::new(se.lat, nw.lng), LatLng::new(nw.lat, se.lng))
    }

    /// Degree spacing for graticule lines at the current zoom.
    pub fn graticule_step(&self) -> f64 {
        let px_per_degree = self.world_size() / 360.0;
        GRID_STEPS
            .iter()
            .copied()
            .find(|step| step * px_per_degree >= GRID_MIN_SPACING)
            .unwrap_or(GRID_STEPS[GRID_STEPS.len() - 1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MELBOURNE: LatLng = LatLng::new(-37.8136, 144.9631);

    fn close(a: LatLng, b: LatLng) -> bool {
        (a.lat - b.lat).abs() < 1e-6 && (a.lng - b.lng).abs() < 1e-6
    }

    fn camera() -> MapCamera {
        let mut camera = MapCamera::new(MELBOURNE, 11.0);
        camera.set_viewport(Size::new(1000.0, 800.0));
        camera
    }

    #[test]
    fn test_projection_round_trip() {
        for p in [LatLng::new(0.0, 0.0), MELBOURNE, LatLng::new(40.7128, -74.006)] {
            assert!(close(unproject(project(p)), p));
        }
    }

    #[test]
    fn test_center_maps_to_viewport_center() {
        let camera = camera();
        let p = camera.latlng_to_screen(MELBOURNE);
        assert!((p.x - 500.0).abs() < 1e-6);
        assert!((p.y - 400.0).abs() < 1e-6);
        assert!(close(camera.screen_to_latlng(Point::new(500.0, 400.0)), MELBOURNE));
    }

    #[test]
    fn test_screen_round_trip() {
        let camera = camera();
        let screen = Point::new(123.0, 456.0);
        let back = camera.latlng_to_screen(camera.screen_to_latlng(screen));
        assert!((back - screen).hypot() < 1e-6);
    }

    #[test]
    fn test_pan_moves_content() {
        let mut camera = camera();
        let before = camera.latlng_to_screen(MELBOURNE);
        camera.pan(Vec2::new(30.0, -20.0));
        let after = camera.latlng_to_screen(MELBOURNE);
        assert!((after - before - Vec2::new(30.0, -20.0)).hypot() < 1e-6);
    }

    #[test]
    fn test_zoom_at_keeps_anchor_fixed() {
        let mut camera = camera();
        let anchor = Point::new(200.0, 150.0);
        let under = camera.screen_to_latlng(anchor);
        camera.zoom_at(anchor, 1.5);
        assert!((camera.zoom() - 12.5).abs() < 1e-9);
        assert!(close(camera.screen_to_latlng(anchor), under));
    }

    #[test]
    fn test_zoom_clamped() {
        let mut camera = camera();
        camera.zoom_by(100.0);
        assert_eq!(camera.zoom(), MAX_ZOOM);
        camera.zoom_by(-100.0);
        assert_eq!(camera.zoom(), MIN_ZOOM);
    }

    #[test]
    fn test_pan_to_animates_without_zoom_change() {
        let mut camera = camera();
        let start = Instant::now();
        let target = LatLng::new(-37.9, 145.1);

        camera.pan_to(target, start);
        assert!(camera.is_animating());

        assert!(camera.tick(start + Duration::from_millis(150)));
        let midway = camera.center();
        assert!(!close(midway, MELBOURNE));
        assert!(!close(midway, target));

        assert!(!camera.tick(start + PAN_DURATION));
        assert!(close(camera.center(), target));
        assert_eq!(camera.zoom(), 11.0);
    }

    #[test]
    fn test_manual_pan_cancels_animation() {
        let mut camera = camera();
        camera.pan_to(LatLng::new(0.0, 0.0), Instant::now());
        camera.pan(Vec2::new(1.0, 1.0));
        assert!(!camera.is_animating());
    }

    #[test]
    fn test_pan_to_current_center_is_noop() {
        let mut camera = camera();
        camera.pan_to(MELBOURNE, Instant::now());
        assert!(!camera.is_animating());
    }

    #[test]
    fn test_wraps_across_antimeridian() {
        let mut camera = MapCamera::new(LatLng::new(0.0, 179.9), 8.0);
        camera.set_viewport(Size::new(1000.0, 800.0));
        let east = camera.latlng_to_screen(LatLng::new(0.0, -179.9));
        assert!(east.x > 500.0 && east.x < 1000.0);

        let clicked = camera.screen_to_latlng(Point::new(900.0, 400.0));
        assert!(clicked.is_valid());
        assert!(clicked.lng < 0.0);
    }

    #[test]
    fn test_graticule_step_spacing() {
        let mut camera = camera();
        for _ in 0..17 {
            let step = camera.graticule_step();
            let spacing = step * camera.world_size() / 360.0;
            assert!(spacing >= GRID_MIN_SPACING || step == 30.0);
            camera.zoom_by(1.0);
        }
        camera.zoom_by(-100.0);
        assert_eq!(camera.graticule_step(), 30.0);
    }
}
