//! Marker layer: the map's view of the pin list.
//!
//! The layer is rebuilt from the store on every change, but keyed by pin id
//! so callers learn exactly which markers appeared, disappeared or moved and
//! can leave the rest alone.

use crate::camera::MapCamera;
use crate::highlight::{HighlightState, MarkerStyle};
use crate::pin::{LatLng, Pin, PinId};
use kurbo::{Point, Rect};
use std::collections::HashMap;

/// Marker icon edge length in logical pixels.
pub const MARKER_SIZE: f64 = 32.0;

/// One rendered marker.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: PinId,
    /// Zero-based position in the pin list.
    pub index: usize,
    pub position: LatLng,
    pub style: MarkerStyle,
    pub geocoding: bool,
}

impl Marker {
    /// The `#n` label shared with the list.
    pub fn label(&self) -> String {
        format!("#{}", self.index + 1)
    }
}

/// Icon rectangle for a marker whose tip sits at `anchor`.
pub fn marker_rect(anchor: Point) -> Rect {
    let half = MARKER_SIZE / 2.0;
    Rect::new(anchor.x - half, anchor.y - MARKER_SIZE, anchor.x + half, anchor.y)
}

/// Changes produced by one reconcile pass.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerDiff {
    pub added: Vec<PinId>,
    pub removed: Vec<PinId>,
    pub moved: Vec<PinId>,
}

impl MarkerDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty() && self.moved.is_empty()
    }
}

/// A marker following the pointer before the drop is committed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragPreview {
    pub id: PinId,
    pub position: LatLng,
}

#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    drag: Option<DragPreview>,
}

impl MarkerLayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Markers in draw order; later ones are on top.
    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn get(&self, id: PinId) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Bring the layer in line with the pin list and highlight state.
    pub fn reconcile(&mut self, pins: &[Pin], highlight: &HighlightState) -> MarkerDiff {
        let mut previous: HashMap<PinId, Marker> =
            self.markers.drain(..).map(|m| (m.id, m)).collect();
        let mut diff = MarkerDiff::default();

        for (index, pin) in pins.iter().enumerate() {
            let position = pin.position();
            match previous.remove(&pin.id) {
                None => diff.added.push(pin.id),
                Some(old) if old.position != position => diff.moved.push(pin.id),
                Some(_) => {}
            }
            self.markers.push(Marker {
                id: pin.id,
                index,
                position,
                style: highlight.marker_style(pin.id),
                geocoding: pin.is_geocoding,
            });
        }

        diff.removed = previous.into_keys().collect();
        if let Some(drag) = self.drag {
            if diff.removed.contains(&drag.id) {
                self.drag = None;
            }
        }
        diff
    }

    /// Where a marker is currently drawn, honoring an active drag.
    pub fn display_position(&self, marker: &Marker) -> LatLng {
        match self.drag {
            Some(drag) if drag.id == marker.id => drag.position,
            _ => marker.position,
        }
    }

    /// Topmost marker whose icon contains `point`.
    pub fn hit_test(&self, camera: &MapCamera, point: Point) -> Option<PinId> {
        self.markers
            .iter()
            .rev()
            .find(|m| marker_rect(camera.latlng_to_screen(self.display_position(m))).contains(point))
            .map(|m| m.id)
    }

    pub fn begin_drag(&mut self, id: PinId) -> bool {
        let Some(marker) = self.get(id) else {
            return false;
        };
        self.drag = Some(DragPreview {
            id,
            position: marker.position,
        });
        true
    }

    pub fn update_drag(&mut self, position: LatLng) {
        if let Some(drag) = &mut self.drag {
            drag.position = position.normalized();
        }
    }

    /// Finish a drag, returning the drop target to commit.
    pub fn end_drag(&mut self) -> Option<DragPreview> {
        self.drag.take()
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    pub fn drag(&self) -> Option<DragPreview> {
        self.drag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::PinStore;
    use kurbo::Size;

    fn store_with(n: usize) -> PinStore {
        let mut store = PinStore::new();
        for i in 0..n {
            store.create(LatLng::new(i as f64 * 0.01, i as f64 * 0.01));
        }
        store
    }

    #[test]
    fn test_reconcile_reports_added_removed_moved() {
        let mut store = store_with(3);
        let ids: Vec<PinId> = store.pins().iter().map(|p| p.id).collect();
        let highlight = HighlightState::new();
        let mut layer = MarkerLayer::new();

        let diff = layer.reconcile(store.pins(), &highlight);
        assert_eq!(diff.added, ids);
        assert!(diff.removed.is_empty() && diff.moved.is_empty());

        assert!(layer.reconcile(store.pins(), &highlight).is_empty());

        store.remove(ids[0]);
        store.move_pin(ids[2], LatLng::new(5.0, 5.0));
        let added = store.create(LatLng::new(1.0, 1.0)).pin_id;

        let diff = layer.reconcile(store.pins(), &highlight);
        assert_eq!(diff.added, vec![added]);
        assert_eq!(diff.removed, vec![ids[0]]);
        assert_eq!(diff.moved, vec![ids[2]]);
    }

    #[test]
    fn test_indices_follow_store_order() {
        let mut store = store_with(3);
        let ids: Vec<PinId> = store.pins().iter().map(|p| p.id).collect();
        let mut layer = MarkerLayer::new();
        layer.reconcile(store.pins(), &HighlightState::new());
        assert_eq!(layer.get(ids[2]).unwrap().label(), "#3");

        store.remove(ids[0]);
        layer.reconcile(store.pins(), &HighlightState::new());
        assert_eq!(layer.get(ids[2]).unwrap().label(), "#2");
    }

    #[test]
    fn test_styles_follow_highlight() {
        let store = store_with(2);
        let (a, b) = (store.pins()[0].id, store.pins()[1].id);
        let mut highlight = HighlightState::new();
        highlight.set_selected(Some(a));
        let mut layer = MarkerLayer::new();
        layer.reconcile(store.pins(), &highlight);

        assert!(layer.get(a).unwrap().style.highlighted);
        assert!(layer.get(b).unwrap().style.faded);
        assert!(layer.get(b).unwrap().geocoding);
    }

    #[test]
    fn test_hit_test_picks_topmost() {
        let mut store = PinStore::new();
        let bottom = store.create(LatLng::new(0.0, 0.0)).pin_id;
        let top = store.create(LatLng::new(0.0, 0.0)).pin_id;
        let mut layer = MarkerLayer::new();
        layer.reconcile(store.pins(), &HighlightState::new());

        let mut camera = MapCamera::new(LatLng::new(0.0, 0.0), 11.0);
        camera.set_viewport(Size::new(400.0, 400.0));

        // Tip at (200, 200); icon extends upward.
        assert_eq!(layer.hit_test(&camera, Point::new(200.0, 190.0)), Some(top));
        assert_eq!(layer.hit_test(&camera, Point::new(200.0, 210.0)), None);

        store.remove(top);
        layer.reconcile(store.pins(), &HighlightState::new());
        assert_eq!(layer.hit_test(&camera, Point::new(200.0, 190.0)), Some(bottom));
    }

    #[test]
    fn test_drag_preview_does_not_touch_store() {
        let store = store_with(1);
        let id = store.pins()[0].id;
        let mut layer = MarkerLayer::new();
        layer.reconcile(store.pins(), &HighlightState::new());

        assert!(layer.begin_drag(id));
        layer.update_drag(LatLng::new(3.0, 4.0));
        let marker = layer.get(id).unwrap().clone();
        assert_eq!(layer.display_position(&marker), LatLng::new(3.0, 4.0));
        assert_eq!(store.pins()[0].position(), LatLng::new(0.0, 0.0));

        let drop = layer.end_drag().unwrap();
        assert_eq!(drop, DragPreview { id, position: LatLng::new(3.0, 4.0) });
        assert_eq!(layer.display_position(&marker), marker.position);
    }

    #[test]
    fn test_drag_cancelled_when_pin_removed() {
        let mut store = store_with(1);
        let id = store.pins()[0].id;
        let mut layer = MarkerLayer::new();
        layer.reconcile(store.pins(), &HighlightState::new());
        layer.begin_drag(id);

        store.remove(id);
        layer.reconcile(store.pins(), &HighlightState::new());
        assert!(layer.drag().is_none());
        assert!(!layer.begin_drag(id));
    }
}
