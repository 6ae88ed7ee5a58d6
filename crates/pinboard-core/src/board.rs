//! `PinBoard`: the owned state container behind both surfaces.
//!
//! Surfaces read snapshots from it and send events into it; it is the only
//! place that mutates pins, hover/selection, or the saved copy.

use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use crate::config::PinboardConfig;
use crate::highlight::{HighlightState, HoverTransition, MarkerStyle};
use crate::pin::{LatLng, Pin, PinId};
use crate::storage::{Persistence, Storage};
use crate::store::{ApplyOutcome, GeocodeCompletion, GeocodeRequest, PinStore};

pub struct PinBoard<S: Storage> {
    store: PinStore,
    highlight: HighlightState,
    persistence: Persistence<S>,
    /// Geocodes waiting to be handed to the worker.
    outbox: Vec<GeocodeRequest>,
    clear_pending: bool,
    geocode_timeout: Duration,
}

impl<S: Storage> PinBoard<S> {
    pub fn new(storage: S, config: &PinboardConfig) -> Self {
        Self {
            store: PinStore::new(),
            highlight: HighlightState::new(),
            persistence: Persistence::new(storage, config.storage_key.clone()),
            outbox: Vec::new(),
            clear_pending: false,
            geocode_timeout: config.geocode_timeout,
        }
    }

    /// Load saved pins. Must run before anything is persisted.
    ///
    /// Returns the number of pins restored.
    pub fn hydrate(&mut self) -> usize {
        if self.persistence.is_loaded() {
            log::warn!("PinBoard already hydrated");
            return 0;
        }
        let saved = self.persistence.load();
        let before = self.store.len();
        let requests = self.store.restore(saved);
        let restored = self.store.len() - before;
        if !requests.is_empty() {
            log::info!("Re-requesting {} unfinished geocodes", requests.len());
        }
        self.outbox.extend(requests);
        log::info!("Restored {} saved pins", restored);
        restored
    }

    pub fn store(&self) -> &PinStore {
        &self.store
    }

    pub fn pins(&self) -> &[Pin] {
        self.store.pins()
    }

    pub fn highlight(&self) -> &HighlightState {
        &self.highlight
    }

    pub fn persistence(&self) -> &Persistence<S> {
        &self.persistence
    }

    /// 1-based list position, as shown in `#n` badges.
    pub fn display_index(&self, id: PinId) -> Option<usize> {
        self.store.index_of(id).map(|i| i + 1)
    }

    pub fn marker_style(&self, id: PinId) -> MarkerStyle {
        self.highlight.marker_style(id)
    }

    pub fn has_pending_geocodes(&self) -> bool {
        self.store.in_flight_count() > 0
    }

    pub fn create_pin(&mut self, position: LatLng) -> PinId {
        let request = self.store.create(position);
        let id = request.pin_id;
        self.outbox.push(request);
        log::info!("Added pin #{}", self.store.len());
        id
    }

    /// Click on empty map: clear selection and drop a pin there.
    pub fn tap_map_background(&mut self, position: LatLng) -> PinId {
        self.highlight.clear_selection();
        self.create_pin(position)
    }

    /// Returns false if the pin no longer exists.
    pub fn move_pin(&mut self, id: PinId, position: LatLng) -> bool {
        match self.store.move_pin(id, position) {
            Some(request) => {
                self.outbox.push(request);
                true
            }
            None => {
                log::debug!("Ignoring move of unknown pin {}", id);
                false
            }
        }
    }

    pub fn delete_pin(&mut self, id: PinId) -> bool {
        let removed = self.store.remove(id).is_some();
        self.highlight.forget(id);
        self.outbox.retain(|r| r.pin_id != id);
        if removed {
            log::info!("Deleted pin {}", id);
        }
        removed
    }

    /// Ask to clear every pin. Returns true if confirmation is now pending.
    pub fn request_clear(&mut self) -> bool {
        self.clear_pending = !self.store.is_empty();
        self.clear_pending
    }

    pub fn is_clear_pending(&self) -> bool {
        self.clear_pending
    }

    pub fn confirm_clear(&mut self) {
        if !std::mem::take(&mut self.clear_pending) {
            return;
        }
        log::info!("Clearing {} pins", self.store.len());
        self.store.clear();
        self.highlight.reset();
        self.outbox.clear();
    }

    pub fn cancel_clear(&mut self) {
        self.clear_pending = false;
    }

    /// Hover a pin (or nothing). Unknown ids count as nothing.
    pub fn set_hovered(&mut self, id: Option<PinId>) -> HoverTransition {
        let id = id.filter(|id| self.store.contains(*id));
        self.highlight.set_hovered(id)
    }

    /// Tap-select a pin with toggle semantics. Unknown ids are ignored.
    pub fn set_selected(&mut self, id: Option<PinId>) -> Option<PinId> {
        match id {
            Some(id) if !self.store.contains(id) => self.highlight.selected(),
            _ => self.highlight.set_selected(id),
        }
    }

    pub fn clear_selection(&mut self) {
        self.highlight.clear_selection();
    }

    pub fn apply_geocode(&mut self, completion: &GeocodeCompletion) -> ApplyOutcome {
        let outcome = self.store.apply_geocode(completion);
        match outcome {
            ApplyOutcome::Applied => {}
            ApplyOutcome::Stale => log::debug!(
                "Discarding stale geocode #{} for pin {}",
                completion.ticket.value(),
                completion.pin_id
            ),
            ApplyOutcome::Missing => log::debug!(
                "Discarding geocode for deleted pin {}",
                completion.pin_id
            ),
        }
        outcome
    }

    /// Requests that still need to be sent to the geocoder.
    pub fn take_geocode_requests(&mut self) -> Vec<GeocodeRequest> {
        std::mem::take(&mut self.outbox)
    }

    /// Per-frame upkeep: time out overdue geocodes, then save if changed.
    ///
    /// Returns true when a save happened.
    pub fn tick(&mut self, now: Instant) -> bool {
        let expired = self.store.expire_overdue(now, self.geocode_timeout);
        if !expired.is_empty() {
            log::warn!("{} geocode(s) timed out", expired.len());
        }
        self.persistence.sync(&self.store)
    }
}
