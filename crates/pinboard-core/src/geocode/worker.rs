//! Runs geocode lookups off the UI thread and hands back completions.
//!
//! On native a single background thread drains a request channel, blocking
//! on each lookup in turn. On WASM each request becomes a browser task via
//! `spawn_local`. Either way results arrive on a channel that the frame loop
//! drains with [`GeocodeWorker::poll`].

use super::{GeocodeError, GeocodeResult, Geocoder, resolve};
use crate::store::{GeocodeCompletion, GeocodeRequest};
use crossbeam_channel::{Receiver, Sender};

#[cfg(not(target_arch = "wasm32"))]
use std::sync::Arc;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;

/// Geocoder handle shared with the worker.
#[cfg(not(target_arch = "wasm32"))]
pub type SharedGeocoder = Arc<dyn Geocoder>;
/// Geocoder handle shared with the worker.
#[cfg(target_arch = "wasm32")]
pub type SharedGeocoder = Rc<dyn Geocoder>;

pub struct GeocodeWorker {
    #[cfg(not(target_arch = "wasm32"))]
    requests: Sender<GeocodeRequest>,
    #[cfg(target_arch = "wasm32")]
    geocoder: SharedGeocoder,
    completion_tx: Sender<GeocodeCompletion>,
    completion_rx: Receiver<GeocodeCompletion>,
}

impl GeocodeWorker {
    /// Start the worker thread.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn new(geocoder: SharedGeocoder) -> GeocodeResult<Self> {
        let (requests, request_rx) = crossbeam_channel::unbounded::<GeocodeRequest>();
        let (completion_tx, completion_rx) = crossbeam_channel::unbounded();

        let results = completion_tx.clone();
        std::thread::Builder::new()
            .name("geocode".to_string())
            .spawn(move || {
                for request in request_rx.iter() {
                    let address = pollster::block_on(resolve(geocoder.as_ref(), request.position));
                    if results
                        .send(GeocodeCompletion::new(&request, address))
                        .is_err()
                    {
                        break;
                    }
                }
                log::debug!("Geocode worker stopped");
            })
            .map_err(|e| {
                log::error!("Failed to start geocode worker: {}", e);
                GeocodeError::Worker
            })?;

        Ok(Self {
            requests,
            completion_tx,
            completion_rx,
        })
    }

    #[cfg(target_arch = "wasm32")]
    pub fn new(geocoder: SharedGeocoder) -> GeocodeResult<Self> {
        let (completion_tx, completion_rx) = crossbeam_channel::unbounded();
        Ok(Self {
            geocoder,
            completion_tx,
            completion_rx,
        })
    }

    /// Queue a lookup.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn submit(&self, request: GeocodeRequest) {
        if let Err(e) = self.requests.send(request) {
            // Worker is gone; settle the pin instead of leaving it spinning.
            log::error!("Geocode worker unavailable, using fallback address");
            let request = e.into_inner();
            let _ = self
                .completion_tx
                .send(GeocodeCompletion::new(&request, super::FALLBACK_ADDRESS));
        }
    }

    /// Queue a lookup.
    #[cfg(target_arch = "wasm32")]
    pub fn submit(&self, request: GeocodeRequest) {
        let geocoder = Rc::clone(&self.geocoder);
        let results = self.completion_tx.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let address = resolve(geocoder.as_ref(), request.position).await;
            let _ = results.send(GeocodeCompletion::new(&request, address));
        });
    }

    /// Drain every completion that has arrived since the last call.
    pub fn poll(&self) -> Vec<GeocodeCompletion> {
        self.completion_rx.try_iter().collect()
    }
}
