//! Renderer trait and per-frame map context.

use kurbo::Size;
use peniko::Color;
use pinboard_core::camera::MapCamera;
use pinboard_core::markers::MarkerLayer;

/// Colors used on the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapPalette {
    pub background: Color,
    pub graticule: Color,
    /// Equator and prime meridian.
    pub graticule_major: Color,
    pub marker: Color,
    pub marker_highlight: Color,
    pub marker_outline: Color,
}

impl Default for MapPalette {
    fn default() -> Self {
        Self {
            background: Color::from_rgba8(232, 238, 243, 255),
            graticule: Color::from_rgba8(148, 163, 184, 90),
            graticule_major: Color::from_rgba8(100, 116, 139, 150),
            marker: Color::from_rgba8(59, 130, 246, 255),
            marker_highlight: Color::from_rgba8(239, 68, 68, 255),
            marker_outline: Color::from_rgba8(255, 255, 255, 255),
        }
    }
}

/// Context for a single render frame.
pub struct RenderContext<'a> {
    pub camera: &'a MapCamera,
    pub markers: &'a MarkerLayer,
    /// Map viewport in logical pixels.
    pub viewport_size: Size,
    /// Device pixel ratio (for HiDPI).
    pub scale_factor: f64,
    pub palette: MapPalette,
    /// Seconds since start; drives the geocoding pulse.
    pub time: f64,
}

impl<'a> RenderContext<'a> {
    pub fn new(camera: &'a MapCamera, markers: &'a MarkerLayer) -> Self {
        Self {
            camera,
            markers,
            viewport_size: camera.viewport(),
            scale_factor: 1.0,
            palette: MapPalette::default(),
            time: 0.0,
        }
    }

    /// Set the scale factor for HiDPI.
    pub fn with_scale_factor(mut self, scale_factor: f64) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    pub fn with_palette(mut self, palette: MapPalette) -> Self {
        self.palette = palette;
        self
    }

    pub fn with_time(mut self, time: f64) -> Self {
        self.time = time;
        self
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the scene/command buffer for a frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.palette.background
    }
}
