//! Vello-based map surface renderer.

use crate::renderer::{MapPalette, RenderContext, Renderer};
use kurbo::{Affine, BezPath, Circle, Ellipse, Point, Rect, Stroke};
use peniko::{Color, Fill};
use pinboard_core::camera::MAX_LATITUDE;
use pinboard_core::markers::{MARKER_SIZE, Marker};
use pinboard_core::pin::LatLng;
use std::f64::consts::TAU;
use vello::Scene;

/// Upper bound on graticule lines per axis.
const MAX_GRID_LINES: usize = 400;
/// Radius of the marker head relative to the marker box.
const HEAD_RADIUS: f64 = MARKER_SIZE * 0.34;
const HIGHLIGHT_SCALE: f64 = 1.2;
const FADED_ALPHA: f32 = 0.4;

/// Vello-based renderer for the map surface.
pub struct VelloRenderer {
    scene: Scene,
}

impl Default for VelloRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl VelloRenderer {
    pub fn new() -> Self {
        Self {
            scene: Scene::new(),
        }
    }

    /// Get the built scene for rendering.
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take ownership of the scene (resets internal scene).
    pub fn take_scene(&mut self) -> Scene {
        std::mem::take(&mut self.scene)
    }

    fn render_background(&mut self, ctx: &RenderContext, transform: Affine) {
        let rect = Rect::new(0.0, 0.0, ctx.viewport_size.width, ctx.viewport_size.height);
        self.scene
            .fill(Fill::NonZero, transform, ctx.palette.background, None, &rect);
    }

    /// Meridians and parallels at the camera's graticule step.
    fn render_graticule(&mut self, ctx: &RenderContext, transform: Affine) {
        let camera = ctx.camera;
        let step = camera.graticule_step();
        let (sw, ne) = camera.visible_bounds();
        let center = camera.center();
        let (width, height) = (ctx.viewport_size.width, ctx.viewport_size.height);
        let stroke = Stroke::new(1.0);

        let mut minor = BezPath::new();
        let mut major = BezPath::new();

        let first = (sw.lng / step).floor() as i64;
        let last = (ne.lng / step).ceil() as i64;
        for i in (first..=last).take(MAX_GRID_LINES) {
            let lng = i as f64 * step;
            let x = camera.latlng_to_screen(LatLng::new(center.lat, lng)).x;
            let path = if (lng.rem_euclid(360.0)).abs() < 1e-9 { &mut major } else { &mut minor };
            path.move_to(Point::new(x, 0.0));
            path.line_to(Point::new(x, height));
        }

        let first = (sw.lat.max(-MAX_LATITUDE) / step).floor() as i64;
        let last = (ne.lat.min(MAX_LATITUDE) / step).ceil() as i64;
        for i in (first..=last).take(MAX_GRID_LINES) {
            let lat = i as f64 * step;
            if lat.abs() > MAX_LATITUDE {
                continue;
            }
            let y = camera.latlng_to_screen(LatLng::new(lat, center.lng)).y;
            let path = if i == 0 { &mut major } else { &mut minor };
            path.move_to(Point::new(0.0, y));
            path.line_to(Point::new(width, y));
        }

        self.scene
            .stroke(&stroke, transform, ctx.palette.graticule, None, &minor);
        self.scene
            .stroke(&stroke, transform, ctx.palette.graticule_major, None, &major);
    }

    fn render_marker(&mut self, ctx: &RenderContext, marker: &Marker, transform: Affine) {
        let position = ctx.markers.display_position(marker);
        let tip = ctx.camera.latlng_to_screen(position);
        let bounds = Rect::new(0.0, 0.0, ctx.viewport_size.width, ctx.viewport_size.height)
            .inflate(MARKER_SIZE, MARKER_SIZE);
        if !bounds.contains(tip) {
            return;
        }

        let dragging = ctx.markers.drag().is_some_and(|d| d.id == marker.id);
        let scale = if marker.style.highlighted || dragging { HIGHLIGHT_SCALE } else { 1.0 };
        let local = transform
            * Affine::translate(tip.to_vec2())
            * Affine::scale(scale);

        let alpha = if marker.style.faded { FADED_ALPHA } else { 1.0 };
        let palette: &MapPalette = &ctx.palette;
        let body = if marker.style.highlighted {
            palette.marker_highlight
        } else {
            palette.marker
        }
        .multiply_alpha(alpha);
        let outline = palette.marker_outline.multiply_alpha(alpha);

        // Shadow at the tip; lifted while dragging.
        let shadow = Ellipse::new(Point::ZERO, (HEAD_RADIUS * 0.7, HEAD_RADIUS * 0.25), 0.0);
        let shadow_alpha = if dragging { 0.35 } else { 0.2 };
        self.scene.fill(
            Fill::NonZero,
            local,
            Color::from_rgba8(0, 0, 0, 255).multiply_alpha(shadow_alpha * alpha),
            None,
            &shadow,
        );

        let lift = if dragging { Affine::translate((0.0, -6.0)) } else { Affine::IDENTITY };
        let local = local * lift;
        let head_center = Point::new(0.0, -(MARKER_SIZE - HEAD_RADIUS - 1.0));
        let head = Circle::new(head_center, HEAD_RADIUS);

        let mut stem = BezPath::new();
        stem.move_to(Point::ZERO);
        stem.line_to(Point::new(-HEAD_RADIUS * 0.8, head_center.y + HEAD_RADIUS * 0.6));
        stem.line_to(Point::new(HEAD_RADIUS * 0.8, head_center.y + HEAD_RADIUS * 0.6));
        stem.close_path();

        self.scene.fill(Fill::NonZero, local, body, None, &stem);
        self.scene.fill(Fill::NonZero, local, body, None, &head);
        self.scene
            .stroke(&Stroke::new(2.0), local, outline, None, &head);
        self.scene.fill(
            Fill::NonZero,
            local,
            outline,
            None,
            &Circle::new(head_center, HEAD_RADIUS * 0.38),
        );

        if marker.geocoding {
            let phase = (ctx.time * TAU).sin() * 0.5 + 0.5;
            let ring = Circle::new(head_center, HEAD_RADIUS + 3.0 + phase * 4.0);
            let ring_color = body.multiply_alpha((1.0 - phase as f32) * 0.8);
            self.scene
                .stroke(&Stroke::new(2.0), local, ring_color, None, &ring);
        }
    }
}

impl Renderer for VelloRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.scene.reset();
        let transform = Affine::scale(ctx.scale_factor);

        self.render_background(ctx, transform);
        self.render_graticule(ctx, transform);

        // Store order, so the last marker is on top as in hit testing.
        for marker in ctx.markers.markers() {
            self.render_marker(ctx, marker, transform);
        }
    }
}
