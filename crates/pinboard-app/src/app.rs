//! Core application state and lifecycle.

use kurbo::{Size, Vec2};
use peniko::Color;
use pinboard_core::geocode::SharedGeocoder;
use pinboard_core::markers::MARKER_SIZE;
use pinboard_core::{
    FALLBACK_ADDRESS, GeocodeCompletion, GeocodeWorker, MapCamera, MarkerLayer,
    NominatimGeocoder, PinBoard, PinboardConfig, PlatformStorage, PointerEvent, PointerKind,
    create_default_storage,
};
use pinboard_render::{MapPalette, RenderContext, Renderer, VelloRenderer};
use std::sync::Arc;
use thiserror::Error;
use vello::util::RenderSurface;
use vello::wgpu::PresentMode;
use winit::application::ApplicationHandler;
#[cfg(not(target_arch = "wasm32"))]
use winit::dpi::LogicalSize;
use winit::event::{ElementState, MouseButton, MouseScrollDelta, TouchPhase, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{Window, WindowId};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use crate::compositor::{CompositeError, Compositor, OverlayFrame};
use crate::event_handler::{EventHandler, MapContext, ZOOM_STEP, scroll_pixels, to_map_point};
use crate::shortcuts::KeyAction;
use crate::ui::{BoardView, PopupView, UiAction, UiState, render_ui};

/// Errors that stop the application from starting.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Event loop error: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),
    #[error("Failed to create window: {0}")]
    Window(String),
    #[error("Failed to create surface: {0}")]
    Surface(String),
    #[error("Failed to create renderer: {0}")]
    Renderer(#[from] CompositeError),
}

/// Application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    /// Map background behind the graticule.
    pub background_color: Color,
    pub pinboard: PinboardConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            title: "Map Pinboard".to_string(),
            width: 1280,
            height: 800,
            background_color: MapPalette::default().background,
            pinboard: PinboardConfig::default(),
        }
    }
}

/// Runtime state for the application.
struct AppState {
    // Windowing
    window: Arc<Window>,
    surface: RenderSurface<'static>,

    // Rendering
    compositor: Compositor,
    map_renderer: VelloRenderer,
    palette: MapPalette,

    // egui
    egui_ctx: egui::Context,
    egui_state: egui_winit::State,
    ui_state: UiState,

    // State
    board: PinBoard<PlatformStorage>,
    camera: MapCamera,
    markers: MarkerLayer,
    event_handler: EventHandler,
    /// None when the geocoder could not be started; lookups then fall back at once.
    geocoder: Option<GeocodeWorker>,
    started: Instant,
}

impl AppState {
    fn split(&mut self) -> (&mut EventHandler, MapContext<'_, PlatformStorage>) {
        let cx = MapContext {
            board: &mut self.board,
            camera: &mut self.camera,
            markers: &mut self.markers,
        };
        (&mut self.event_handler, cx)
    }

    fn scale_factor(&self) -> f64 {
        self.window.scale_factor()
    }

    /// Map viewport in logical pixels for a physical surface size.
    fn update_viewport(&mut self, width: u32, height: u32) {
        let scale = self.scale_factor();
        self.camera
            .set_viewport(Size::new(width as f64 / scale, height as f64 / scale));
    }

    /// Hand new lookups to the worker and fold finished ones back in.
    fn pump_geocoding(&mut self) {
        for request in self.board.take_geocode_requests() {
            match &self.geocoder {
                Some(worker) => worker.submit(request),
                None => {
                    self.board
                        .apply_geocode(&GeocodeCompletion::new(&request, FALLBACK_ADDRESS));
                }
            }
        }
        if let Some(worker) = &self.geocoder {
            for completion in worker.poll() {
                self.board.apply_geocode(&completion);
            }
        }
    }

    fn apply_ui_action(&mut self, action: UiAction, now: Instant) {
        let (handler, mut cx) = self.split();
        match action {
            UiAction::HoverPin(id) => {
                handler.list_hover(id, &mut cx, now);
            }
            UiAction::SelectPin(id) => {
                handler.list_select(id, &mut cx, now);
            }
            UiAction::DeletePin(id) => {
                handler.delete_pin(id, &mut cx);
            }
            UiAction::RequestClear => {
                cx.board.request_clear();
            }
            UiAction::ConfirmClear => cx.board.confirm_clear(),
            UiAction::CancelClear => cx.board.cancel_clear(),
            UiAction::ZoomIn => {
                handler.zoom(ZOOM_STEP, &mut cx);
            }
            UiAction::ZoomOut => {
                handler.zoom(-ZOOM_STEP, &mut cx);
            }
        }
    }

    fn apply_key(&mut self, action: KeyAction) {
        match action {
            KeyAction::ToggleShortcuts => {
                self.ui_state.shortcuts_open = !self.ui_state.shortcuts_open;
            }
            KeyAction::Escape if self.ui_state.shortcuts_open => {
                self.ui_state.shortcuts_open = false;
            }
            _ => {
                let (handler, mut cx) = self.split();
                handler.apply_key(action, &mut cx);
            }
        }
    }

    fn sync_markers(&mut self) {
        let diff = self
            .markers
            .reconcile(self.board.pins(), self.board.highlight());
        if !diff.is_empty() {
            log::debug!(
                "Markers: +{} -{} ~{}",
                diff.added.len(),
                diff.removed.len(),
                diff.moved.len()
            );
        }
    }

    /// Run one frame: upkeep, UI, map scene, then present.
    fn redraw(&mut self, render_cx: &vello::util::RenderContext) {
        let now = Instant::now();

        self.pump_geocoding();
        self.board.tick(now);
        self.camera.tick(now);
        self.sync_markers();

        // Run egui and collect actions
        let egui_input = self.egui_state.take_egui_input(&self.window);
        let view = board_view(&self.board, &self.camera, &self.markers);
        let ui_state = &mut self.ui_state;
        let mut actions = Vec::new();
        let egui_output = self.egui_ctx.run(egui_input, |ctx| {
            actions = render_ui(ctx, ui_state, &view);
        });

        self.egui_state
            .handle_platform_output(&self.window, egui_output.platform_output);
        let egui_primitives = self
            .egui_ctx
            .tessellate(egui_output.shapes, egui_output.pixels_per_point);

        for action in actions {
            self.apply_ui_action(action, now);
        }
        self.sync_markers();

        // Build the map scene
        let render_ctx = RenderContext::new(&self.camera, &self.markers)
            .with_scale_factor(self.scale_factor())
            .with_palette(self.palette)
            .with_time(now.duration_since(self.started).as_secs_f64());
        self.map_renderer.build_scene(&render_ctx);
        let base_color = self.map_renderer.background_color(&render_ctx);
        let scene = self.map_renderer.take_scene();

        let device = &render_cx.devices[self.surface.dev_id];
        let overlay = OverlayFrame {
            primitives: &egui_primitives,
            textures: &egui_output.textures_delta,
            pixels_per_point: egui_output.pixels_per_point,
        };
        if let Err(e) = self.compositor.present(
            &device.device,
            &device.queue,
            &self.surface,
            &scene,
            base_color,
            overlay,
        ) {
            log::warn!("Skipped frame: {}", e);
        }
        self.window.request_redraw();
    }
}

/// Snapshot the board for the UI, with the popup anchored over the focused marker.
fn board_view<'a>(
    board: &'a PinBoard<PlatformStorage>,
    camera: &MapCamera,
    markers: &MarkerLayer,
) -> BoardView<'a> {
    let popup = board.highlight().focused().and_then(|id| {
        let pin = board.store().get(id)?;
        let marker = markers.get(id)?;
        let tip = camera.latlng_to_screen(markers.display_position(marker));
        Some(PopupView {
            pin,
            index: marker.index + 1,
            anchor: egui::Pos2::new(tip.x as f32, (tip.y - MARKER_SIZE) as f32),
        })
    });

    BoardView {
        pins: board.pins(),
        highlight: board.highlight(),
        clear_pending: board.is_clear_pending(),
        popup,
    }
}

/// Start the reverse geocoder. Failure leaves pins with the fallback address.
fn start_geocoder(config: &PinboardConfig) -> Option<GeocodeWorker> {
    let geocoder = match NominatimGeocoder::new(config) {
        Ok(geocoder) => geocoder,
        Err(e) => {
            log::error!("Failed to create geocoder: {}", e);
            return None;
        }
    };
    log::info!("Reverse geocoding via {}", geocoder.url());

    #[cfg(not(target_arch = "wasm32"))]
    let shared: SharedGeocoder = Arc::new(geocoder);
    #[cfg(target_arch = "wasm32")]
    let shared: SharedGeocoder = std::rc::Rc::new(geocoder);

    match GeocodeWorker::new(shared) {
        Ok(worker) => Some(worker),
        Err(e) => {
            log::error!("Failed to start geocode worker: {}", e);
            None
        }
    }
}

/// Main application struct.
pub struct App {
    config: AppConfig,
    state: Option<AppState>,
    render_cx: Option<vello::util::RenderContext>,
    /// Window waiting for async surface creation (WASM only)
    pending_window: Option<Arc<Window>>,
    /// First fatal startup error, reported when the event loop ends.
    init_error: Option<AppError>,
    /// Flag to indicate async init is in progress
    #[cfg(target_arch = "wasm32")]
    init_in_progress: std::cell::Cell<bool>,
}

impl App {
    /// Create a new application with default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Create a new application with custom configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            config,
            state: None,
            render_cx: None,
            pending_window: None,
            init_error: None,
            #[cfg(target_arch = "wasm32")]
            init_in_progress: std::cell::Cell::new(false),
        }
    }

    /// Run the application with default configuration.
    pub async fn run() -> Result<(), AppError> {
        Self::run_with_config(AppConfig::default()).await
    }

    /// Run the application.
    pub async fn run_with_config(config: AppConfig) -> Result<(), AppError> {
        let event_loop = EventLoop::new()?;
        let app = App::with_config(config);

        #[cfg(target_arch = "wasm32")]
        {
            use winit::platform::web::EventLoopExtWebSys;
            event_loop.spawn_app(app);
            Ok(())
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            let mut app = app;
            event_loop.run_app(&mut app)?;
            match app.init_error.take() {
                Some(e) => Err(e),
                None => Ok(()),
            }
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, error: AppError) {
        log::error!("{}", error);
        self.init_error.get_or_insert(error);
        event_loop.exit();
    }

    /// Finish initialization after surface is created.
    fn finish_init(
        &mut self,
        window: Arc<Window>,
        surface: RenderSurface<'static>,
    ) -> Result<(), AppError> {
        let render_cx = self
            .render_cx
            .as_ref()
            .ok_or_else(|| AppError::Surface("render context missing".to_string()))?;
        let device = &render_cx.devices[surface.dev_id].device;

        let compositor = Compositor::new(device, surface.config.format)?;

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &window,
            Some(window.scale_factor() as f32),
            None,
            None,
        );

        let pinboard = &self.config.pinboard;
        let mut board = PinBoard::new(create_default_storage(), pinboard);
        let restored = board.hydrate();

        let (width, height) = (surface.config.width, surface.config.height);
        log::info!(
            "Map Pinboard initialized - {}x{}, {} saved pins",
            width,
            height,
            restored
        );

        let mut state = AppState {
            window: window.clone(),
            surface,
            compositor,
            map_renderer: VelloRenderer::new(),
            palette: MapPalette {
                background: self.config.background_color,
                ..MapPalette::default()
            },
            egui_ctx,
            egui_state,
            ui_state: UiState::default(),
            board,
            camera: MapCamera::new(pinboard.initial_center, pinboard.initial_zoom),
            markers: MarkerLayer::new(),
            event_handler: EventHandler::new(),
            geocoder: start_geocoder(pinboard),
            started: Instant::now(),
        };
        state.update_viewport(width, height);
        self.state = Some(state);
        self.pending_window = None;

        // Request initial redraw
        window.request_redraw();
        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.state.is_some() || self.pending_window.is_some() {
            return;
        }

        log::info!("Creating window...");

        // Native windows get a fixed size; WASM fills the viewport
        #[cfg(not(target_arch = "wasm32"))]
        let window_attrs = Window::default_attributes()
            .with_title(&self.config.title)
            .with_inner_size(LogicalSize::new(self.config.width, self.config.height));

        #[cfg(target_arch = "wasm32")]
        let window_attrs = {
            use winit::platform::web::WindowAttributesExtWebSys;

            match crate::web::mount_canvas((self.config.width, self.config.height)) {
                Ok(canvas) => Window::default_attributes()
                    .with_title(&self.config.title)
                    .with_canvas(Some(canvas)),
                Err(e) => {
                    self.fail(event_loop, e);
                    return;
                }
            }
        };

        let window = match event_loop.create_window(window_attrs) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, AppError::Window(e.to_string()));
                return;
            }
        };

        log::info!("Window created, initializing renderer...");

        // On native, block on async surface creation
        #[cfg(not(target_arch = "wasm32"))]
        {
            let size = window.inner_size();
            let (width, height) = if size.width == 0 || size.height == 0 {
                (self.config.width, self.config.height)
            } else {
                (size.width, size.height)
            };

            let render_cx = self
                .render_cx
                .get_or_insert_with(vello::util::RenderContext::new);

            let created = pollster::block_on(render_cx.create_surface(
                window.clone(),
                width,
                height,
                PresentMode::AutoVsync,
            ));
            let surface = match created {
                Ok(surface) => surface,
                Err(e) => {
                    self.fail(event_loop, AppError::Surface(format!("{:?}", e)));
                    return;
                }
            };

            // The surface only borrows the window, which AppState keeps alive.
            let surface: RenderSurface<'static> = unsafe { std::mem::transmute(surface) };
            if let Err(e) = self.finish_init(window, surface) {
                self.fail(event_loop, e);
            }
        }

        // On WASM, store window for later async initialization
        #[cfg(target_arch = "wasm32")]
        {
            self.pending_window = Some(window);
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        // On WASM, handle async initialization
        #[cfg(target_arch = "wasm32")]
        if self.state.is_none() {
            if let Some(window) = self.pending_window.clone() {
                if !self.init_in_progress.get() {
                    self.init_in_progress.set(true);

                    let (width, height) =
                        crate::web::viewport_size((self.config.width, self.config.height));
                    let self_ptr = self as *mut Self;
                    let window_clone = window.clone();

                    wasm_bindgen_futures::spawn_local(async move {
                        log::info!("Creating surface asynchronously...");

                        let mut render_cx = vello::util::RenderContext::new();

                        match render_cx
                            .create_surface(
                                window_clone.clone(),
                                width,
                                height,
                                PresentMode::AutoVsync,
                            )
                            .await
                        {
                            Ok(surface) => {
                                log::info!("Surface created successfully");

                                let surface: RenderSurface<'static> =
                                    unsafe { std::mem::transmute(surface) };

                                // SAFETY: WASM is single-threaded and the event
                                // loop keeps the App alive.
                                let app = unsafe { &mut *self_ptr };
                                app.render_cx = Some(render_cx);
                                if let Err(e) = app.finish_init(window_clone, surface) {
                                    log::error!("{}", e);
                                    app.init_in_progress.set(false);
                                }
                            }
                            Err(e) => {
                                log::error!("Failed to create surface: {:?}", e);
                                let app = unsafe { &mut *self_ptr };
                                app.init_in_progress.set(false);
                            }
                        }
                    });
                }

                // Keep the event loop running
                window.request_redraw();
            }
            return;
        }

        let Some(state) = &mut self.state else {
            return;
        };

        // Let egui process the event first
        let egui_response = state.egui_state.on_window_event(&state.window, &event);

        // Pointer over a panel or dialog belongs to egui
        let egui_wants_input = egui_response.consumed
            || state.egui_ctx.is_pointer_over_area()
            || state.egui_ctx.wants_pointer_input();

        let scale = state.scale_factor();

        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::Resized(size) => {
                if size.width == 0 || size.height == 0 {
                    return;
                }

                if let Some(render_cx) = self.render_cx.as_mut() {
                    render_cx.resize_surface(&mut state.surface, size.width, size.height);
                }
                state.update_viewport(size.width, size.height);
                state.window.request_redraw();
            }

            WindowEvent::RedrawRequested => {
                if let Some(render_cx) = self.render_cx.as_ref() {
                    state.redraw(render_cx);
                }
            }

            WindowEvent::CursorMoved { position, .. } => {
                let (handler, mut cx) = state.split();
                // A press that started on the map keeps the pointer until release.
                if egui_wants_input && !handler.is_pressed() {
                    handler.pointer_left(&mut cx);
                    return;
                }
                let position = to_map_point(position.x, position.y, scale);
                handler.handle_pointer(PointerEvent::Move { position }, &mut cx);
            }

            WindowEvent::CursorLeft { .. } => {
                let (handler, mut cx) = state.split();
                handler.pointer_left(&mut cx);
            }

            WindowEvent::MouseInput {
                state: btn_state,
                button: MouseButton::Left,
                ..
            } => {
                let (handler, mut cx) = state.split();
                match btn_state {
                    ElementState::Pressed if !egui_wants_input => {
                        handler.mouse_down(&mut cx);
                    }
                    ElementState::Released => {
                        handler.mouse_up(&mut cx);
                    }
                    ElementState::Pressed => {}
                }
            }

            WindowEvent::MouseWheel { delta, .. } => {
                if egui_wants_input {
                    return;
                }
                let anchor = state
                    .event_handler
                    .pointer_position()
                    .unwrap_or_else(|| {
                        let viewport = state.camera.viewport();
                        kurbo::Point::new(viewport.width / 2.0, viewport.height / 2.0)
                    });
                let (handler, mut cx) = state.split();
                match delta {
                    MouseScrollDelta::LineDelta(_, y) => {
                        handler.scroll(anchor, Some(y as f64), None, &mut cx);
                    }
                    MouseScrollDelta::PixelDelta(pos) => {
                        let pixels = scroll_pixels(Vec2::new(pos.x, pos.y), scale);
                        handler.scroll(anchor, None, Some(pixels), &mut cx);
                    }
                }
            }

            WindowEvent::Touch(touch) => {
                let position = to_map_point(touch.location.x, touch.location.y, scale);
                let pointer = match touch.phase {
                    TouchPhase::Started => {
                        if egui_wants_input {
                            return;
                        }
                        PointerEvent::Down {
                            position,
                            kind: PointerKind::Touch,
                        }
                    }
                    TouchPhase::Moved => PointerEvent::Move { position },
                    TouchPhase::Ended => PointerEvent::Up { position },
                    TouchPhase::Cancelled => PointerEvent::Cancel,
                };
                let (handler, mut cx) = state.split();
                handler.handle_touch(touch.id, pointer, &mut cx);
            }

            WindowEvent::KeyboardInput { event, .. } => {
                // Typing into an egui widget
                if event.state != ElementState::Pressed || state.egui_ctx.wants_keyboard_input() {
                    return;
                }
                if let Some(action) = KeyAction::from_key(&event.logical_key) {
                    state.apply_key(action);
                }
            }

            _ => {}
        }
    }
}
