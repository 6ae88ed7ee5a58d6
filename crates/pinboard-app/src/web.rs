//! WebAssembly entry point and platform-specific code.

use pinboard_core::PinboardConfig;
use wasm_bindgen::prelude::*;

use crate::app::{App, AppConfig, AppError};
use crate::view_params::{ViewParams, parse_view_params};

/// Read the starting view from the page URL, query string first.
pub fn get_view_params() -> ViewParams {
    let Some(window) = web_sys::window() else {
        return ViewParams::default();
    };
    let location = window.location();

    let query = location
        .search()
        .map(|s| parse_view_params(&s))
        .unwrap_or_default();
    let hash = location
        .hash()
        .map(|s| parse_view_params(&s))
        .unwrap_or_default();

    query.or(hash)
}

const CANVAS_ID: &str = "map-pinboard-canvas";

/// Browser viewport in physical pixels, or `fallback` scaled by the pixel ratio.
pub(crate) fn viewport_size(fallback: (u32, u32)) -> (u32, u32) {
    let Some(window) = web_sys::window() else {
        return fallback;
    };
    let dpr = window.device_pixel_ratio();
    let css = |value: Result<JsValue, JsValue>, default: u32| {
        value.ok().and_then(|v| v.as_f64()).unwrap_or(default as f64)
    };
    let width = css(window.inner_width(), fallback.0);
    let height = css(window.inner_height(), fallback.1);
    ((width * dpr) as u32, (height * dpr) as u32)
}

/// Find or create the map canvas under `#app`, sized to fill the viewport.
pub(crate) fn mount_canvas(fallback: (u32, u32)) -> Result<web_sys::HtmlCanvasElement, AppError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| AppError::Window("no document".to_string()))?;

    if let Some(loading) = document.get_element_by_id("loading") {
        loading.remove();
    }

    let canvas = match document.get_element_by_id(CANVAS_ID) {
        Some(existing) => existing,
        None => {
            let parent = document
                .get_element_by_id("app")
                .ok_or_else(|| AppError::Window("missing #app element".to_string()))?;
            let created = document
                .create_element("canvas")
                .map_err(|e| AppError::Window(format!("{:?}", e)))?;
            created.set_id(CANVAS_ID);
            parent
                .append_child(&created)
                .map_err(|e| AppError::Window(format!("{:?}", e)))?;
            created
        }
    };
    let canvas: web_sys::HtmlCanvasElement = canvas
        .dyn_into()
        .map_err(|_| AppError::Window(format!("#{} is not a canvas", CANVAS_ID)))?;

    let (width, height) = viewport_size(fallback);
    canvas.set_width(width);
    canvas.set_height(height);

    // Fill the page and keep touch gestures away from browser scrolling
    let style = canvas.style();
    for (name, value) in [
        ("position", "fixed"),
        ("inset", "0"),
        ("width", "100%"),
        ("height", "100%"),
        ("display", "block"),
        ("touch-action", "none"),
    ] {
        let _ = style.set_property(name, value);
    }

    log::info!("Canvas mounted at {}x{}", width, height);
    Ok(canvas)
}

/// Initialize and run the WASM application.
#[wasm_bindgen(start)]
pub async fn run_wasm() {
    // Set up panic hook for better error messages
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::error_1(&format!("Failed to initialize logger: {}", e).into());
    }

    log::info!("Starting Map Pinboard (WASM)");

    let params = get_view_params();
    if let Some(center) = params.center {
        log::info!("Initial center from URL: {}", center.to_decimal_string());
    }

    let config = AppConfig {
        pinboard: PinboardConfig::default().with_initial_view(params.center, params.zoom),
        ..AppConfig::default()
    };

    if let Err(e) = App::run_with_config(config).await {
        log::error!("Map Pinboard failed to start: {}", e);
    }
}
