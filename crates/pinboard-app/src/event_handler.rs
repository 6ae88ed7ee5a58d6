//! Event handling for the map surface and the pin list.
//!
//! Raw pointer events are turned into gestures by the core tracker; this
//! module decides what each gesture means for the board and the camera.

use kurbo::{Point, Vec2};
use pinboard_core::input::{zoom_delta_from_lines, zoom_delta_from_pixels};
use pinboard_core::{
    Gesture, MapCamera, MarkerLayer, PinBoard, PinId, PointerEvent, PointerKind, PointerTracker,
    Storage,
};

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use crate::shortcuts::KeyAction;

/// Zoom levels per +/- button or key press.
pub const ZOOM_STEP: f64 = 1.0;

/// Mutable view of everything an event can touch.
pub struct MapContext<'a, S: Storage> {
    pub board: &'a mut PinBoard<S>,
    pub camera: &'a mut MapCamera,
    pub markers: &'a mut MarkerLayer,
}

/// Which surface set the current hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoverSource {
    Map,
    List,
}

/// What the current drag is moving.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DragTarget {
    Map,
    Marker(PinId),
}

/// Handles high-level events and translates them to board operations.
#[derive(Debug, Default)]
pub struct EventHandler {
    tracker: PointerTracker,
    drag: Option<DragTarget>,
    hover_source: Option<HoverSource>,
    /// Finger driving the pointer; other touches are ignored.
    active_touch: Option<u64>,
}

impl EventHandler {
    pub fn new() -> Self {
        Self::default()
    }

    /// A press is in progress on the map.
    pub fn is_pressed(&self) -> bool {
        self.tracker.is_pressed()
    }

    pub fn is_dragging_marker(&self) -> bool {
        matches!(self.drag, Some(DragTarget::Marker(_)))
    }

    pub fn pointer_position(&self) -> Option<Point> {
        self.tracker.position()
    }

    /// Feed a pointer event in map coordinates. Returns true if anything changed.
    pub fn handle_pointer<S: Storage>(
        &mut self,
        event: PointerEvent,
        cx: &mut MapContext<'_, S>,
    ) -> bool {
        match self.tracker.handle(event) {
            Some(gesture) => self.handle_gesture(gesture, cx),
            None => false,
        }
    }

    /// Press the mouse button at the last known cursor position.
    pub fn mouse_down<S: Storage>(&mut self, cx: &mut MapContext<'_, S>) -> bool {
        let Some(position) = self.tracker.position() else {
            return false;
        };
        self.handle_pointer(
            PointerEvent::Down {
                position,
                kind: PointerKind::Mouse,
            },
            cx,
        )
    }

    pub fn mouse_up<S: Storage>(&mut self, cx: &mut MapContext<'_, S>) -> bool {
        let Some(position) = self.tracker.position() else {
            return false;
        };
        self.handle_pointer(PointerEvent::Up { position }, cx)
    }

    /// Feed a touch event. Only the first finger down drives the pointer.
    pub fn handle_touch<S: Storage>(
        &mut self,
        finger: u64,
        event: PointerEvent,
        cx: &mut MapContext<'_, S>,
    ) -> bool {
        match event {
            PointerEvent::Down { .. } if self.active_touch.is_none() => {
                self.active_touch = Some(finger);
            }
            _ if self.active_touch != Some(finger) => return false,
            PointerEvent::Up { .. } | PointerEvent::Cancel => self.active_touch = None,
            _ => {}
        }
        let changed = self.handle_pointer(event, cx);
        if self.active_touch.is_none() {
            self.tracker.leave();
        }
        changed
    }

    /// The cursor left the map area.
    pub fn pointer_left<S: Storage>(&mut self, cx: &mut MapContext<'_, S>) -> bool {
        let mut changed = false;
        if self.tracker.is_pressed() {
            changed |= self.handle_pointer(PointerEvent::Cancel, cx);
        }
        self.tracker.leave();
        if self.hover_source == Some(HoverSource::Map) {
            self.hover_source = None;
            changed |= !cx.board.set_hovered(None).is_noop();
        }
        changed
    }

    /// Wheel or trackpad scroll over the map; zooms around the cursor.
    pub fn scroll<S: Storage>(
        &mut self,
        anchor: Point,
        lines: Option<f64>,
        pixels: Option<f64>,
        cx: &mut MapContext<'_, S>,
    ) -> bool {
        let delta = lines.map(zoom_delta_from_lines).unwrap_or(0.0)
            + pixels.map(zoom_delta_from_pixels).unwrap_or(0.0);
        if delta == 0.0 {
            return false;
        }
        cx.camera.zoom_at(anchor, delta);
        true
    }

    fn handle_gesture<S: Storage>(&mut self, gesture: Gesture, cx: &mut MapContext<'_, S>) -> bool {
        match gesture {
            Gesture::Hover { position } => self.map_hover(position, cx),
            Gesture::Tap { position, kind } => {
                match cx.markers.hit_test(cx.camera, position) {
                    Some(id) if kind == PointerKind::Touch => {
                        cx.board.set_selected(Some(id));
                    }
                    // Mouse users get the popup from hovering.
                    Some(_) => return false,
                    None => {
                        let at = cx.camera.screen_to_latlng(position);
                        cx.board.tap_map_background(at);
                    }
                }
                true
            }
            Gesture::DragStart { origin, position } => {
                match cx.markers.hit_test(cx.camera, origin) {
                    Some(id) if cx.markers.begin_drag(id) => {
                        cx.markers.update_drag(cx.camera.screen_to_latlng(position));
                        self.drag = Some(DragTarget::Marker(id));
                    }
                    _ => {
                        cx.camera.pan(position - origin);
                        self.drag = Some(DragTarget::Map);
                    }
                }
                true
            }
            Gesture::DragMove { position, delta } => match self.drag {
                Some(DragTarget::Marker(_)) => {
                    cx.markers.update_drag(cx.camera.screen_to_latlng(position));
                    true
                }
                Some(DragTarget::Map) => {
                    cx.camera.pan(delta);
                    true
                }
                None => false,
            },
            Gesture::DragEnd { position } => match self.drag.take() {
                Some(DragTarget::Marker(id)) => {
                    cx.markers.update_drag(cx.camera.screen_to_latlng(position));
                    match cx.markers.end_drag() {
                        Some(drop) if drop.id == id => cx.board.move_pin(id, drop.position),
                        _ => false,
                    }
                }
                Some(DragTarget::Map) | None => false,
            },
            Gesture::DragCancel => {
                if let Some(DragTarget::Marker(_)) = self.drag.take() {
                    cx.markers.cancel_drag();
                }
                true
            }
        }
    }

    /// Entering a marker recenters the map on it. The hover holds while that
    /// recenter runs, since the marker slides out from under a still cursor.
    fn map_hover<S: Storage>(&mut self, position: Point, cx: &mut MapContext<'_, S>) -> bool {
        match cx.markers.hit_test(cx.camera, position) {
            Some(id) => {
                self.hover_source = Some(HoverSource::Map);
                let transition = cx.board.set_hovered(Some(id));
                if let Some(pin) = transition.entered.and_then(|id| cx.board.store().get(id)) {
                    cx.camera.pan_to(pin.position(), Instant::now());
                }
                !transition.is_noop()
            }
            None if self.hover_source == Some(HoverSource::Map) && cx.camera.is_animating() => {
                false
            }
            None if self.hover_source == Some(HoverSource::Map) => {
                self.hover_source = None;
                !cx.board.set_hovered(None).is_noop()
            }
            None => false,
        }
    }

    /// Pointer entered or left a list row. Entering a row recenters the map on its pin.
    pub fn list_hover<S: Storage>(
        &mut self,
        id: Option<PinId>,
        cx: &mut MapContext<'_, S>,
        now: Instant,
    ) -> bool {
        if id.is_none() && self.hover_source != Some(HoverSource::List) {
            return false;
        }
        let transition = cx.board.set_hovered(id);
        self.hover_source = transition.entered.map(|_| HoverSource::List);
        if let Some(pin) = transition.entered.and_then(|id| cx.board.store().get(id)) {
            cx.camera.pan_to(pin.position(), now);
        }
        !transition.is_noop()
    }

    /// Tap on a list row: toggle selection, recentering on a newly selected pin.
    pub fn list_select<S: Storage>(
        &mut self,
        id: PinId,
        cx: &mut MapContext<'_, S>,
        now: Instant,
    ) -> bool {
        let before = cx.board.highlight().selected();
        let after = cx.board.set_selected(Some(id));
        if let Some(pin) = after.and_then(|id| cx.board.store().get(id)) {
            cx.camera.pan_to(pin.position(), now);
        }
        before != after
    }

    pub fn delete_pin<S: Storage>(&mut self, id: PinId, cx: &mut MapContext<'_, S>) -> bool {
        if self.drag == Some(DragTarget::Marker(id)) {
            self.drag = None;
            cx.markers.cancel_drag();
        }
        cx.board.delete_pin(id)
    }

    pub fn zoom<S: Storage>(&mut self, delta: f64, cx: &mut MapContext<'_, S>) -> bool {
        cx.camera.zoom_by(delta);
        true
    }

    /// Apply a keyboard action. `ToggleShortcuts` belongs to the UI and is ignored here.
    pub fn apply_key<S: Storage>(&mut self, action: KeyAction, cx: &mut MapContext<'_, S>) -> bool {
        match action {
            KeyAction::Escape => {
                if cx.board.is_clear_pending() {
                    cx.board.cancel_clear();
                } else if self.is_dragging_marker() {
                    self.handle_pointer(PointerEvent::Cancel, cx);
                } else {
                    cx.board.clear_selection();
                }
                true
            }
            KeyAction::DeleteSelected => match cx.board.highlight().selected() {
                Some(id) => self.delete_pin(id, cx),
                None => false,
            },
            KeyAction::ZoomIn => self.zoom(ZOOM_STEP, cx),
            KeyAction::ZoomOut => self.zoom(-ZOOM_STEP, cx),
            KeyAction::ToggleShortcuts => false,
        }
    }
}

/// Convert a window position in physical pixels to map coordinates.
pub fn to_map_point(x: f64, y: f64, scale_factor: f64) -> Point {
    Point::new(x, y) / scale_factor.max(f64::EPSILON)
}

/// Scroll distance in logical pixels, y up.
pub fn scroll_pixels(delta: Vec2, scale_factor: f64) -> f64 {
    delta.y / scale_factor.max(f64::EPSILON)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Size;
    use pinboard_core::pin::UPDATING_ADDRESS;
    use pinboard_core::storage::MemoryStorage;
    use pinboard_core::{LatLng, PinboardConfig};
    use std::time::Duration;

    struct Fixture {
        board: PinBoard<MemoryStorage>,
        camera: MapCamera,
        markers: MarkerLayer,
        handler: EventHandler,
    }

    impl Fixture {
        fn new() -> Self {
            let mut camera = MapCamera::new(LatLng::new(0.0, 0.0), 4.0);
            camera.set_viewport(Size::new(800.0, 600.0));
            Self {
                board: PinBoard::new(MemoryStorage::new(), &PinboardConfig::default()),
                camera,
                markers: MarkerLayer::new(),
                handler: EventHandler::new(),
            }
        }

        fn split(&mut self) -> (&mut EventHandler, MapContext<'_, MemoryStorage>) {
            let cx = MapContext {
                board: &mut self.board,
                camera: &mut self.camera,
                markers: &mut self.markers,
            };
            (&mut self.handler, cx)
        }

        fn sync_markers(&mut self) {
            self.markers
                .reconcile(self.board.pins(), self.board.highlight());
        }

        fn pointer(&mut self, event: PointerEvent) -> bool {
            let (handler, mut cx) = self.split();
            handler.handle_pointer(event, &mut cx)
        }

        fn click(&mut self, x: f64, y: f64, kind: PointerKind) {
            let position = Point::new(x, y);
            self.pointer(PointerEvent::Down { position, kind });
            self.pointer(PointerEvent::Up { position });
            self.sync_markers();
        }

        fn drag(&mut self, from: Point, to: Point) {
            self.pointer(PointerEvent::Down {
                position: from,
                kind: PointerKind::Mouse,
            });
            self.pointer(PointerEvent::Move { position: to });
            self.pointer(PointerEvent::Up { position: to });
            self.sync_markers();
        }
    }

    #[test]
    fn test_click_on_empty_map_creates_pin() {
        let mut f = Fixture::new();
        f.click(400.0, 300.0, PointerKind::Mouse);

        assert_eq!(f.board.pins().len(), 1);
        let pin = &f.board.pins()[0];
        assert!(pin.lat.abs() < 1e-9 && pin.lng.abs() < 1e-9);
        assert!(pin.is_geocoding);
        assert_eq!(f.board.take_geocode_requests().len(), 1);
    }

    #[test]
    fn test_click_clears_selection() {
        let mut f = Fixture::new();
        let id = f.board.create_pin(LatLng::new(10.0, 10.0));
        f.board.set_selected(Some(id));

        f.click(100.0, 100.0, PointerKind::Mouse);
        assert_eq!(f.board.highlight().selected(), None);
        assert_eq!(f.board.pins().len(), 2);
    }

    #[test]
    fn test_mouse_click_on_marker_does_not_create_pin() {
        let mut f = Fixture::new();
        f.click(400.0, 300.0, PointerKind::Mouse);
        f.click(400.0, 290.0, PointerKind::Mouse);
        assert_eq!(f.board.pins().len(), 1);
        assert_eq!(f.board.highlight().selected(), None);
    }

    #[test]
    fn test_touch_tap_on_marker_toggles_selection() {
        let mut f = Fixture::new();
        f.click(400.0, 300.0, PointerKind::Touch);
        let id = f.board.pins()[0].id;

        f.click(400.0, 290.0, PointerKind::Touch);
        assert_eq!(f.board.highlight().selected(), Some(id));
        assert_eq!(f.board.pins().len(), 1);

        f.click(400.0, 290.0, PointerKind::Touch);
        assert_eq!(f.board.highlight().selected(), None);
    }

    #[test]
    fn test_hover_marker_recenters_map() {
        let mut f = Fixture::new();
        f.click(600.0, 300.0, PointerKind::Mouse);
        let id = f.board.pins()[0].id;
        let pin = f.board.pins()[0].position();

        assert!(f.pointer(PointerEvent::Move {
            position: Point::new(605.0, 285.0)
        }));
        assert_eq!(f.board.highlight().hovered(), Some(id));
        assert!(f.camera.is_animating());

        // Still hovered while the marker slides toward the center
        f.pointer(PointerEvent::Move {
            position: Point::new(100.0, 100.0),
        });
        assert_eq!(f.board.highlight().hovered(), Some(id));

        f.camera.tick(Instant::now() + Duration::from_secs(1));
        assert!(!f.camera.is_animating());
        let center = f.camera.center();
        assert!((center.lat - pin.lat).abs() < 1e-6);
        assert!((center.lng - pin.lng).abs() < 1e-6);

        f.pointer(PointerEvent::Move {
            position: Point::new(100.0, 110.0),
        });
        assert_eq!(f.board.highlight().hovered(), None);
    }

    #[test]
    fn test_rehovering_same_marker_does_not_restart_recenter() {
        let mut f = Fixture::new();
        f.click(400.0, 300.0, PointerKind::Mouse);
        let id = f.board.pins()[0].id;

        f.pointer(PointerEvent::Move {
            position: Point::new(400.0, 290.0),
        });
        assert_eq!(f.board.highlight().hovered(), Some(id));
        // Already centered
        assert!(!f.camera.is_animating());
        assert!(!f.pointer(PointerEvent::Move {
            position: Point::new(401.0, 289.0)
        }));
    }

    #[test]
    fn test_drag_marker_moves_pin_and_regeocodes() {
        let mut f = Fixture::new();
        f.click(400.0, 300.0, PointerKind::Mouse);
        f.board.take_geocode_requests();
        let id = f.board.pins()[0].id;

        f.drag(Point::new(400.0, 290.0), Point::new(500.0, 290.0));

        let pin = f.board.store().get(id).unwrap();
        assert!(pin.lng > 0.0);
        assert!(pin.is_geocoding);
        assert_eq!(pin.address, UPDATING_ADDRESS);
        assert_eq!(f.board.take_geocode_requests().len(), 1);
        assert!(f.markers.drag().is_none());
        assert_eq!(f.board.pins().len(), 1);
    }

    #[test]
    fn test_drag_empty_map_pans_without_creating() {
        let mut f = Fixture::new();
        f.drag(Point::new(100.0, 100.0), Point::new(200.0, 100.0));

        assert!(f.board.pins().is_empty());
        assert!(f.camera.center().lng < 0.0);
    }

    #[test]
    fn test_cancel_drag_leaves_pin_in_place() {
        let mut f = Fixture::new();
        f.click(400.0, 300.0, PointerKind::Mouse);
        f.board.take_geocode_requests();

        f.pointer(PointerEvent::Down {
            position: Point::new(400.0, 290.0),
            kind: PointerKind::Mouse,
        });
        f.pointer(PointerEvent::Move {
            position: Point::new(480.0, 290.0),
        });
        assert!(f.handler.is_dragging_marker());

        let (handler, mut cx) = f.split();
        handler.apply_key(KeyAction::Escape, &mut cx);

        assert!(f.markers.drag().is_none());
        assert!(f.board.take_geocode_requests().is_empty());
        assert!(f.board.pins()[0].lng.abs() < 1e-9);
    }

    #[test]
    fn test_list_hover_recenters_map() {
        let mut f = Fixture::new();
        let id = f.board.create_pin(LatLng::new(20.0, 30.0));
        let now = Instant::now();

        let (handler, mut cx) = f.split();
        assert!(handler.list_hover(Some(id), &mut cx, now));
        assert!(f.camera.is_animating());

        f.camera.tick(now + Duration::from_secs(1));
        let center = f.camera.center();
        assert!((center.lat - 20.0).abs() < 1e-6);
        assert!((center.lng - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_list_leave_does_not_clear_map_hover() {
        let mut f = Fixture::new();
        f.click(400.0, 300.0, PointerKind::Mouse);
        let id = f.board.pins()[0].id;
        f.pointer(PointerEvent::Move {
            position: Point::new(400.0, 290.0),
        });

        let now = Instant::now();
        let (handler, mut cx) = f.split();
        assert!(!handler.list_hover(None, &mut cx, now));
        assert_eq!(f.board.highlight().hovered(), Some(id));
    }

    #[test]
    fn test_map_move_off_marker_keeps_list_hover() {
        let mut f = Fixture::new();
        let id = f.board.create_pin(LatLng::new(50.0, 50.0));
        f.sync_markers();
        let now = Instant::now();
        let (handler, mut cx) = f.split();
        handler.list_hover(Some(id), &mut cx, now);

        f.pointer(PointerEvent::Move {
            position: Point::new(10.0, 10.0),
        });
        assert_eq!(f.board.highlight().hovered(), Some(id));
    }

    #[test]
    fn test_pointer_left_clears_map_hover() {
        let mut f = Fixture::new();
        f.click(400.0, 300.0, PointerKind::Mouse);
        f.pointer(PointerEvent::Move {
            position: Point::new(400.0, 290.0),
        });

        let (handler, mut cx) = f.split();
        assert!(handler.pointer_left(&mut cx));
        assert_eq!(f.board.highlight().hovered(), None);
        assert!(f.handler.pointer_position().is_none());
    }

    #[test]
    fn test_second_finger_is_ignored() {
        let mut f = Fixture::new();
        let (handler, mut cx) = f.split();
        handler.handle_touch(
            1,
            PointerEvent::Down {
                position: Point::new(100.0, 100.0),
                kind: PointerKind::Touch,
            },
            &mut cx,
        );
        handler.handle_touch(
            2,
            PointerEvent::Down {
                position: Point::new(300.0, 300.0),
                kind: PointerKind::Touch,
            },
            &mut cx,
        );
        handler.handle_touch(
            2,
            PointerEvent::Up {
                position: Point::new(300.0, 300.0),
            },
            &mut cx,
        );
        assert!(f.board.pins().is_empty());

        let (handler, mut cx) = f.split();
        handler.handle_touch(
            1,
            PointerEvent::Up {
                position: Point::new(100.0, 100.0),
            },
            &mut cx,
        );
        assert_eq!(f.board.pins().len(), 1);
    }

    #[test]
    fn test_delete_key_removes_selected() {
        let mut f = Fixture::new();
        let keep = f.board.create_pin(LatLng::new(1.0, 1.0));
        let gone = f.board.create_pin(LatLng::new(2.0, 2.0));
        f.board.set_selected(Some(gone));

        let (handler, mut cx) = f.split();
        assert!(handler.apply_key(KeyAction::DeleteSelected, &mut cx));
        assert_eq!(f.board.pins().len(), 1);
        assert_eq!(f.board.pins()[0].id, keep);

        let (handler, mut cx) = f.split();
        assert!(!handler.apply_key(KeyAction::DeleteSelected, &mut cx));
    }

    #[test]
    fn test_escape_cancels_clear_before_selection() {
        let mut f = Fixture::new();
        let id = f.board.create_pin(LatLng::new(1.0, 1.0));
        f.board.set_selected(Some(id));
        f.board.request_clear();

        let (handler, mut cx) = f.split();
        handler.apply_key(KeyAction::Escape, &mut cx);
        assert!(!f.board.is_clear_pending());
        assert_eq!(f.board.highlight().selected(), Some(id));

        let (handler, mut cx) = f.split();
        handler.apply_key(KeyAction::Escape, &mut cx);
        assert_eq!(f.board.highlight().selected(), None);
    }

    #[test]
    fn test_scroll_zooms_around_cursor() {
        let mut f = Fixture::new();
        let (handler, mut cx) = f.split();
        assert!(handler.scroll(Point::new(400.0, 300.0), Some(2.0), None, &mut cx));
        assert!((f.camera.zoom() - 5.0).abs() < 1e-9);

        let (handler, mut cx) = f.split();
        assert!(!handler.scroll(Point::new(400.0, 300.0), None, Some(0.0), &mut cx));
    }

    #[test]
    fn test_to_map_point_divides_scale() {
        assert_eq!(to_map_point(200.0, 100.0, 2.0), Point::new(100.0, 50.0));
    }
}
