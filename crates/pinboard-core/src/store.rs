//! The ordered pin collection and its geocode bookkeeping.
//!
//! `PinStore` is the single owner of all pins. Every geocode it asks for is
//! stamped with a [`GeocodeTicket`]; a completion is applied only when its
//! ticket is still the latest one issued for that pin, so a slow response for
//! an earlier position can never overwrite the address of a later one, and a
//! response for a deleted pin is dropped.

use std::collections::HashMap;
use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;
#[cfg(target_arch = "wasm32")]
use web_time::Instant;

use crate::geocode::FALLBACK_ADDRESS;
use crate::pin::{LatLng, Pin, PinId, UPDATING_ADDRESS};

/// Monotonically increasing stamp identifying one geocode request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct GeocodeTicket(u64);

impl GeocodeTicket {
    pub fn value(self) -> u64 {
        self.0
    }
}

/// A geocode the store wants performed.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeRequest {
    pub pin_id: PinId,
    pub ticket: GeocodeTicket,
    pub position: LatLng,
}

/// A finished geocode, carrying either the resolved or the fallback address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeCompletion {
    pub pin_id: PinId,
    pub ticket: GeocodeTicket,
    pub address: String,
}

impl GeocodeCompletion {
    pub fn new(request: &GeocodeRequest, address: impl Into<String>) -> Self {
        Self {
            pin_id: request.pin_id,
            ticket: request.ticket,
            address: address.into(),
        }
    }
}

/// What happened to a completion handed to [`PinStore::apply_geocode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The pin took the address.
    Applied,
    /// A newer request for the pin was issued after this one.
    Stale,
    /// The pin no longer exists.
    Missing,
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    ticket: GeocodeTicket,
    issued_at: Instant,
}

/// Ordered sequence of pins; insertion order is display order.
#[derive(Debug, Default)]
pub struct PinStore {
    pins: Vec<Pin>,
    in_flight: HashMap<PinId, InFlight>,
    next_ticket: u64,
    revision: u64,
}

impl PinStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All pins in insertion order.
    pub fn pins(&self) -> &[Pin] {
        &self.pins
    }

    pub fn len(&self) -> usize {
        self.pins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pins.is_empty()
    }

    pub fn get(&self, id: PinId) -> Option<&Pin> {
        self.pins.iter().find(|p| p.id == id)
    }

    /// Zero-based position of a pin in the sequence.
    pub fn index_of(&self, id: PinId) -> Option<usize> {
        self.pins.iter().position(|p| p.id == id)
    }

    pub fn contains(&self, id: PinId) -> bool {
        self.index_of(id).is_some()
    }

    /// Bumped on every mutation; used to detect when a save is due.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Number of pins with a geocode outstanding.
    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    /// Append a new pin and return the geocode it needs.
    pub fn create(&mut self, position: LatLng) -> GeocodeRequest {
        let pin = Pin::new(position);
        let id = pin.id;
        let position = pin.position();
        self.pins.push(pin);
        self.touch();
        log::debug!("Created pin {} at {}", id, position.to_decimal_string());
        self.issue(id, position)
    }

    /// Move a pin in place. Returns `None` if the id is unknown.
    pub fn move_pin(&mut self, id: PinId, position: LatLng) -> Option<GeocodeRequest> {
        let pin = self.pins.iter_mut().find(|p| p.id == id)?;
        pin.set_position(position);
        pin.address = UPDATING_ADDRESS.to_string();
        pin.is_geocoding = true;
        let position = pin.position();
        self.touch();
        log::debug!("Moved pin {} to {}", id, position.to_decimal_string());
        Some(self.issue(id, position))
    }

    /// Remove a pin; any outstanding geocode for it becomes orphaned.
    pub fn remove(&mut self, id: PinId) -> Option<Pin> {
        let index = self.index_of(id)?;
        self.in_flight.remove(&id);
        let pin = self.pins.remove(index);
        self.touch();
        Some(pin)
    }

    /// Remove every pin.
    pub fn clear(&mut self) {
        self.pins.clear();
        self.in_flight.clear();
        self.touch();
    }

    /// Apply a finished geocode if it is still the latest for a live pin.
    pub fn apply_geocode(&mut self, completion: &GeocodeCompletion) -> ApplyOutcome {
        let Some(pin) = self.pins.iter_mut().find(|p| p.id == completion.pin_id) else {
            return ApplyOutcome::Missing;
        };
        match self.in_flight.get(&completion.pin_id) {
            Some(pending) if pending.ticket == completion.ticket => {}
            _ => return ApplyOutcome::Stale,
        }
        self.in_flight.remove(&completion.pin_id);
        pin.address = completion.address.clone();
        pin.is_geocoding = false;
        self.touch();
        ApplyOutcome::Applied
    }

    /// Resolve every geocode older than `timeout` to the fallback address.
    ///
    /// Returns the ids that were expired. A late response for an expired
    /// request is then treated as stale.
    pub fn expire_overdue(&mut self, now: Instant, timeout: Duration) -> Vec<PinId> {
        let overdue: Vec<(PinId, GeocodeTicket)> = self
            .in_flight
            .iter()
            .filter(|(_, pending)| now.saturating_duration_since(pending.issued_at) >= timeout)
            .map(|(id, pending)| (*id, pending.ticket))
            .collect();

        let mut expired = Vec::with_capacity(overdue.len());
        for (pin_id, ticket) in overdue {
            let completion = GeocodeCompletion {
                pin_id,
                ticket,
                address: FALLBACK_ADDRESS.to_string(),
            };
            if self.apply_geocode(&completion) == ApplyOutcome::Applied {
                expired.push(pin_id);
            }
        }
        expired
    }

    /// Put previously saved pins ahead of any pins created this session.
    ///
    /// Pins with invalid coordinates or an id already present are skipped.
    /// Pins that were saved mid-geocode get a fresh request, returned here.
    pub fn restore(&mut self, pins: Vec<Pin>) -> Vec<GeocodeRequest> {
        let mut accepted: Vec<Pin> = Vec::with_capacity(pins.len());
        for pin in pins {
            if !pin.position().is_valid() {
                log::warn!("Dropping saved pin {} with invalid coordinates", pin.id);
                continue;
            }
            if self.contains(pin.id) || accepted.iter().any(|p| p.id == pin.id) {
                log::warn!("Dropping saved pin with duplicate id {}", pin.id);
                continue;
            }
            accepted.push(pin);
        }

        let pending: Vec<(PinId, LatLng)> = accepted
            .iter()
            .filter(|p| p.is_geocoding)
            .map(|p| (p.id, p.position()))
            .collect();
        self.pins.splice(0..0, accepted);
        self.touch();

        pending
            .into_iter()
            .map(|(id, position)| self.issue(id, position))
            .collect()
    }

    fn issue(&mut self, pin_id: PinId, position: LatLng) -> GeocodeRequest {
        self.next_ticket += 1;
        let ticket = GeocodeTicket(self.next_ticket);
        self.in_flight.insert(
            pin_id,
            InFlight {
                ticket,
                issued_at: Instant::now(),
            },
        );
        GeocodeRequest {
            pin_id,
            ticket,
            position,
        }
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pin::LOADING_ADDRESS;
    use std::collections::HashSet;

    fn complete(request: &GeocodeRequest, address: &str) -> GeocodeCompletion {
        GeocodeCompletion::new(request, address)
    }

    #[test]
    fn test_create_then_resolve() {
        let mut store = PinStore::new();
        let request = store.create(LatLng::new(40.7128, -74.0060));

        assert_eq!(store.len(), 1);
        let pin = &store.pins()[0];
        assert_eq!(pin.id, request.pin_id);
        assert!(pin.is_geocoding);
        assert_eq!(pin.address, LOADING_ADDRESS);
        assert_eq!(store.index_of(pin.id), Some(0));

        let outcome = store.apply_geocode(&complete(&request, "123 Main St"));
        assert_eq!(outcome, ApplyOutcome::Applied);
        let pin = store.get(request.pin_id).unwrap();
        assert_eq!(pin.address, "123 Main St");
        assert!(!pin.is_geocoding);
        assert_eq!(store.in_flight_count(), 0);
    }

    #[test]
    fn test_move_keeps_id_and_order() {
        let mut store = PinStore::new();
        let a = store.create(LatLng::new(1.0, 1.0)).pin_id;
        let b = store.create(LatLng::new(2.0, 2.0)).pin_id;
        let c = store.create(LatLng::new(3.0, 3.0)).pin_id;

        let request = store.move_pin(b, LatLng::new(5.0, 6.0)).unwrap();
        assert_eq!(request.pin_id, b);

        let ids: Vec<PinId> = store.pins().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![a, b, c]);
        let moved = store.get(b).unwrap();
        assert_eq!(moved.position(), LatLng::new(5.0, 6.0));
        assert_eq!(moved.address, UPDATING_ADDRESS);
        assert!(moved.is_geocoding);
    }

    #[test]
    fn test_move_unknown_is_noop() {
        let mut store = PinStore::new();
        store.create(LatLng::new(1.0, 1.0));
        let revision = store.revision();
        assert!(store.move_pin(PinId::new_v4(), LatLng::new(0.0, 0.0)).is_none());
        assert_eq!(store.revision(), revision);
    }

    #[test]
    fn test_stale_result_discarded_even_when_last() {
        let mut store = PinStore::new();
        let created = store.create(LatLng::new(0.0, 0.0));
        let id = created.pin_id;
        store.apply_geocode(&complete(&created, "Origin"));

        let first = store.move_pin(id, LatLng::new(1.0, 1.0)).unwrap();
        let second = store.move_pin(id, LatLng::new(2.0, 2.0)).unwrap();
        assert!(second.ticket > first.ticket);

        assert_eq!(store.apply_geocode(&complete(&second, "Second")), ApplyOutcome::Applied);
        assert_eq!(store.apply_geocode(&complete(&first, "First")), ApplyOutcome::Stale);

        let pin = store.get(id).unwrap();
        assert_eq!(pin.address, "Second");
        assert!(!pin.is_geocoding);
    }

    #[test]
    fn test_stale_result_arriving_first_does_not_clear_flag() {
        let mut store = PinStore::new();
        let id = store.create(LatLng::new(0.0, 0.0)).pin_id;
        let first = store.move_pin(id, LatLng::new(1.0, 1.0)).unwrap();
        let second = store.move_pin(id, LatLng::new(2.0, 2.0)).unwrap();

        assert_eq!(store.apply_geocode(&complete(&first, "First")), ApplyOutcome::Stale);
        let pin = store.get(id).unwrap();
        assert!(pin.is_geocoding);
        assert_eq!(pin.address, UPDATING_ADDRESS);

        assert_eq!(store.apply_geocode(&complete(&second, "Second")), ApplyOutcome::Applied);
        assert_eq!(store.get(id).unwrap().address, "Second");
    }

    #[test]
    fn test_delete_during_geocode_does_not_resurrect() {
        let mut store = PinStore::new();
        let request = store.create(LatLng::new(0.0, 0.0));
        store.remove(request.pin_id);

        assert_eq!(store.apply_geocode(&complete(&request, "Late")), ApplyOutcome::Missing);
        assert!(store.is_empty());
        assert!(store.get(request.pin_id).is_none());
    }

    #[test]
    fn test_remove_and_clear() {
        let mut store = PinStore::new();
        let a = store.create(LatLng::new(1.0, 1.0)).pin_id;
        let b = store.create(LatLng::new(2.0, 2.0)).pin_id;

        assert!(store.remove(PinId::new_v4()).is_none());
        assert_eq!(store.remove(a).map(|p| p.id), Some(a));
        assert_eq!(store.index_of(b), Some(0));

        store.clear();
        assert!(store.is_empty());
        assert_eq!(store.in_flight_count(), 0);
    }

    #[test]
    fn test_ids_unique_and_order_preserved_over_mixed_ops() {
        let mut store = PinStore::new();
        let mut expected = Vec::new();
        for i in 0..20 {
            let id = store.create(LatLng::new(i as f64, i as f64)).pin_id;
            expected.push(id);
            if i % 3 == 0 {
                store.move_pin(id, LatLng::new(-(i as f64), 0.0));
            }
            if i % 4 == 1 {
                let victim = expected.remove(0);
                store.remove(victim);
            }
        }

        let ids: Vec<PinId> = store.pins().iter().map(|p| p.id).collect();
        assert_eq!(ids, expected);
        let unique: HashSet<PinId> = ids.iter().copied().collect();
        assert_eq!(unique.len(), ids.len());
    }

    #[test]
    fn test_expire_overdue_resolves_to_fallback() {
        let mut store = PinStore::new();
        let request = store.create(LatLng::new(0.0, 0.0));
        let timeout = Duration::from_secs(15);

        assert!(store.expire_overdue(Instant::now(), timeout).is_empty());

        let later = Instant::now() + Duration::from_secs(16);
        assert_eq!(store.expire_overdue(later, timeout), vec![request.pin_id]);

        let pin = store.get(request.pin_id).unwrap();
        assert_eq!(pin.address, FALLBACK_ADDRESS);
        assert!(!pin.is_geocoding);

        // The real response finally shows up and is ignored.
        assert_eq!(store.apply_geocode(&complete(&request, "Too late")), ApplyOutcome::Stale);
    }

    #[test]
    fn test_restore_skips_duplicates_and_invalid() {
        let mut store = PinStore::new();
        let mut good = Pin::new(LatLng::new(1.0, 1.0));
        good.is_geocoding = false;
        good.address = "Somewhere".to_string();
        let duplicate = good.clone();
        let mut invalid = Pin::new(LatLng::new(0.0, 0.0));
        invalid.lat = 123.0;
        let pending = Pin::new(LatLng::new(2.0, 2.0));
        let pending_id = pending.id;

        let requests = store.restore(vec![good.clone(), duplicate, invalid, pending]);

        assert_eq!(store.len(), 2);
        assert_eq!(store.pins()[0], good);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].pin_id, pending_id);
        assert_eq!(store.in_flight_count(), 1);
    }

    #[test]
    fn test_restore_goes_before_session_pins() {
        let mut store = PinStore::new();
        let fresh = store.create(LatLng::new(0.0, 0.0)).pin_id;
        let mut saved = Pin::new(LatLng::new(1.0, 1.0));
        saved.is_geocoding = false;
        let saved_id = saved.id;

        assert!(store.restore(vec![saved]).is_empty());
        assert_eq!(store.index_of(saved_id), Some(0));
        assert_eq!(store.index_of(fresh), Some(1));
    }

    #[test]
    fn test_revision_bumps_on_mutation() {
        let mut store = PinStore::new();
        let r0 = store.revision();
        let request = store.create(LatLng::new(0.0, 0.0));
        let r1 = store.revision();
        assert!(r1 > r0);
        store.apply_geocode(&complete(&request, "Here"));
        assert!(store.revision() > r1);
    }
}
