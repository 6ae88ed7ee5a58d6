//! Unified mouse/touch pointer tracking for the map.
//!
//! Raw pointer events go in, map gestures come out: a press that stays
//! within the drag threshold is a tap, anything further is a drag.

use kurbo::{Point, Vec2};

/// How the pointer is being driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

impl PointerKind {
    /// Movement in logical pixels before a press turns into a drag.
    pub fn drag_threshold(self) -> f64 {
        match self {
            PointerKind::Mouse => 4.0,
            PointerKind::Touch => 10.0,
        }
    }
}

/// Pointer event in map-viewport coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { position: Point, kind: PointerKind },
    Move { position: Point },
    Up { position: Point },
    /// Touch interrupted or pointer left the window mid-press.
    Cancel,
}

/// What a sequence of pointer events amounted to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    /// Pointer moved with no button down.
    Hover { position: Point },
    /// Press released without moving past the threshold.
    Tap { position: Point, kind: PointerKind },
    /// Movement just crossed the threshold. `origin` is where the press began.
    DragStart { origin: Point, position: Point },
    DragMove { position: Point, delta: Vec2 },
    DragEnd { position: Point },
    DragCancel,
}

#[derive(Debug, Clone, Copy)]
struct Press {
    origin: Point,
    last: Point,
    kind: PointerKind,
    dragging: bool,
}

#[derive(Debug, Clone, Default)]
pub struct PointerTracker {
    position: Option<Point>,
    press: Option<Press>,
    last_kind: Option<PointerKind>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last known pointer position, if the pointer is over the map.
    pub fn position(&self) -> Option<Point> {
        self.position
    }

    pub fn is_pressed(&self) -> bool {
        self.press.is_some()
    }

    pub fn is_dragging(&self) -> bool {
        self.press.is_some_and(|p| p.dragging)
    }

    /// Modality of the most recent press.
    pub fn last_kind(&self) -> Option<PointerKind> {
        self.last_kind
    }

    /// Forget the pointer position (cursor left the map).
    pub fn leave(&mut self) {
        if self.press.is_none() {
            self.position = None;
        }
    }

    pub fn handle(&mut self, event: PointerEvent) -> Option<Gesture> {
        match event {
            PointerEvent::Down { position, kind } => {
                self.position = Some(position);
                self.last_kind = Some(kind);
                if self.press.is_none() {
                    self.press = Some(Press {
                        origin: position,
                        last: position,
                        kind,
                        dragging: false,
                    });
                }
                None
            }
            PointerEvent::Move { position } => {
                self.position = Some(position);
                let Some(press) = &mut self.press else {
                    return Some(Gesture::Hover { position });
                };
                if press.dragging {
                    let delta = position - press.last;
                    press.last = position;
                    return Some(Gesture::DragMove { position, delta });
                }
                if (position - press.origin).hypot() > press.kind.drag_threshold() {
                    press.dragging = true;
                    press.last = position;
                    return Some(Gesture::DragStart {
                        origin: press.origin,
                        position,
                    });
                }
                None
            }
            PointerEvent::Up { position } => {
                self.position = Some(position);
                let press = self.press.take()?;
                if press.dragging {
                    Some(Gesture::DragEnd { position })
                } else {
                    Some(Gesture::Tap {
                        position: press.origin,
                        kind: press.kind,
                    })
                }
            }
            PointerEvent::Cancel => {
                let press = self.press.take()?;
                press.dragging.then_some(Gesture::DragCancel)
            }
        }
    }
}

/// Zoom levels per wheel notch.
pub const ZOOM_PER_LINE: f64 = 0.5;
/// Pixel-precise scroll distance equal to one wheel notch.
pub const PIXELS_PER_LINE: f64 = 50.0;

/// Zoom delta for a wheel scroll measured in lines. Scrolling up zooms in.
pub fn zoom_delta_from_lines(lines: f64) -> f64 {
    lines * ZOOM_PER_LINE
}

/// Zoom delta for a trackpad scroll measured in pixels.
pub fn zoom_delta_from_pixels(pixels: f64) -> f64 {
    pixels / PIXELS_PER_LINE * ZOOM_PER_LINE
}
