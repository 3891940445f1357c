//! Discovery event router
//!
//! A single task owns every registry mutation. It consumes discovery events
//! in delivery order, runs each resolution as its own task in a [`JoinSet`]
//! and applies finished resolutions as they complete.
//!
//! Per-device state is implicit in registry membership:
//!
//! ```text
//! Unknown --available--> (resolving) --success--> Available --unavailable--> Unknown
//!                              |
//!                              +--failure--> unchanged
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use openhome_discovery::{ActiveSearch, Announcement, DiscoveryEvent};
use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};

use crate::config::{DeviceManagerConfig, ResolutionOrdering};
use crate::device::Device;
use crate::error::{MalformedAnnouncement, ResolveError};
use crate::identifier::{extract_identifier, DeviceId};
use crate::registry::Registry;
use crate::resolver::Resolve;

/// What triggered a resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    /// `ssdp:alive` notification; the result goes into the registry
    Available,
    /// Active search response; the result is only logged
    Found,
}

struct Resolution {
    id: DeviceId,
    origin: Origin,
    /// Arrival sequence of the triggering event
    seq: u64,
    result: Result<Device, ResolveError>,
}

/// Arrival bookkeeping for a device with resolutions in flight.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Pending {
    /// Sequence of the newest available/unavailable event
    latest: u64,
    /// Available-triggered resolutions not yet applied
    in_flight: usize,
}

pub(crate) struct Router {
    registry: Registry,
    resolver: Arc<dyn Resolve>,
    search_target: String,
    notification_type: String,
    ordering: ResolutionOrdering,
    in_flight: JoinSet<Resolution>,
    sequence: u64,
    /// Tracked under `ArrivalOrder` only, and only while resolutions are in flight
    pending: HashMap<DeviceId, Pending>,
}

impl Router {
    pub(crate) fn new(config: &DeviceManagerConfig, registry: Registry, resolver: Arc<dyn Resolve>) -> Self {
        Self {
            registry,
            resolver,
            search_target: config.search_target.clone(),
            notification_type: config.notification_type.clone(),
            ordering: config.ordering,
            in_flight: JoinSet::new(),
            sequence: 0,
            pending: HashMap::new(),
        }
    }

    /// Run until the event channel closes or `shutdown` fires, then wait for
    /// in-flight resolutions and apply their results.
    pub(crate) async fn run(
        mut self,
        search: Arc<dyn ActiveSearch>,
        mut events: mpsc::Receiver<DiscoveryEvent>,
        mut shutdown: oneshot::Receiver<()>,
    ) {
        self.search(search.as_ref()).await;

        loop {
            tokio::select! {
                // Events already queued are routed before a shutdown is honoured
                biased;

                event = events.recv() => match event {
                    Some(event) => self.on_event(event),
                    None => {
                        tracing::debug!("Discovery event channel closed");
                        break;
                    }
                },
                Some(joined) = self.in_flight.join_next(), if !self.in_flight.is_empty() => {
                    self.apply(joined);
                }
                _ = &mut shutdown => {
                    tracing::debug!("Router shutdown requested");
                    break;
                }
            }
        }

        events.close();

        if !self.in_flight.is_empty() {
            tracing::debug!("Waiting for {} in-flight resolution(s)", self.in_flight.len());
        }
        while self.complete_next().await {}

        tracing::debug!("Router stopped");
    }

    /// Issue the startup active search. Responses arrive as `Found` events.
    async fn search(&self, search: &dyn ActiveSearch) {
        match search.search(&self.search_target).await {
            Ok(()) => tracing::debug!("Searching for {}", self.search_target),
            Err(e) => tracing::warn!("Active search for {} failed: {}", self.search_target, e),
        }
    }

    pub(crate) fn on_event(&mut self, event: DiscoveryEvent) {
        self.sequence += 1;
        let seq = self.sequence;

        match event {
            DiscoveryEvent::Available(announcement) => {
                if announcement.target != self.notification_type {
                    tracing::trace!("Ignoring alive for {}", announcement.target);
                    return;
                }
                self.start_resolution(announcement, Origin::Available, seq);
            }
            DiscoveryEvent::Unavailable(announcement) => {
                if announcement.target != self.notification_type {
                    tracing::trace!("Ignoring byebye for {}", announcement.target);
                    return;
                }
                self.on_unavailable(&announcement, seq);
            }
            DiscoveryEvent::Found(announcement) => {
                if announcement.target != self.search_target {
                    tracing::trace!("Ignoring search response for {}", announcement.target);
                    return;
                }
                self.start_resolution(announcement, Origin::Found, seq);
            }
        }
    }

    fn on_unavailable(&mut self, announcement: &Announcement, seq: u64) {
        let id = match extract_identifier(&announcement.usn) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Dropping byebye: {}", e);
                return;
            }
        };

        // Nothing in flight means nothing can go stale
        if let Some(pending) = self.pending.get_mut(&id) {
            pending.latest = seq;
        }

        match self.registry.remove(&id) {
            Some(device) => tracing::info!("Device unavailable: {} ({})", device.name, id),
            None => tracing::debug!("Byebye for unknown device {}", id),
        }
    }

    fn start_resolution(&mut self, announcement: Announcement, origin: Origin, seq: u64) {
        let id = match extract_identifier(&announcement.usn) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!("Dropping announcement: {}", e);
                return;
            }
        };

        let location = match announcement.location {
            Some(location) => location,
            None => {
                tracing::warn!(
                    "Dropping announcement: {}",
                    MalformedAnnouncement::MissingLocation(announcement.usn)
                );
                return;
            }
        };

        if origin == Origin::Available && self.ordering == ResolutionOrdering::ArrivalOrder {
            let pending = self.pending.entry(id.clone()).or_default();
            pending.latest = seq;
            pending.in_flight += 1;
        }

        tracing::debug!("Resolving {} from {}", id, location);

        let resolver = Arc::clone(&self.resolver);
        self.in_flight.spawn(async move {
            let result = resolver.resolve(&id, &location).await;
            Resolution {
                id,
                origin,
                seq,
                result,
            }
        });
    }

    /// Wait for the next resolution to finish and apply it.
    ///
    /// Returns `false` when nothing is in flight.
    pub(crate) async fn complete_next(&mut self) -> bool {
        match self.in_flight.join_next().await {
            Some(joined) => {
                self.apply(joined);
                true
            }
            None => false,
        }
    }

    fn apply(&mut self, joined: Result<Resolution, JoinError>) {
        let Resolution {
            id,
            origin,
            seq,
            result,
        } = match joined {
            Ok(resolution) => resolution,
            Err(e) => {
                tracing::error!("Resolution task failed: {}", e);
                return;
            }
        };

        let stale = origin == Origin::Available && self.settle(&id, seq);

        match (origin, result) {
            (Origin::Found, Ok(device)) => {
                tracing::info!("Found {} ({}) at {}", device.name, id, device.url_root);
            }
            (Origin::Found, Err(e)) => {
                tracing::warn!("Failed to resolve search response for {}: {}", id, e);
            }
            (Origin::Available, Err(e)) => {
                tracing::warn!("Failed to resolve {}: {}", id, e);
            }
            (Origin::Available, Ok(device)) => {
                if stale {
                    tracing::debug!("Discarding stale resolution of {}", id);
                    return;
                }
                let name = device.name.clone();
                match self.registry.put(id.clone(), device) {
                    Some(_) => tracing::debug!("Device updated: {} ({})", name, id),
                    None => tracing::info!("Device available: {} ({})", name, id),
                }
            }
        }
    }

    /// Account for a finished available-triggered resolution and report
    /// whether a newer event has superseded it.
    ///
    /// The device's entry is dropped once nothing is left in flight.
    fn settle(&mut self, id: &DeviceId, seq: u64) -> bool {
        let Some(pending) = self.pending.get_mut(id) else {
            return false;
        };

        let stale = pending.latest != seq;
        pending.in_flight = pending.in_flight.saturating_sub(1);
        if pending.in_flight == 0 {
            self.pending.remove(id);
        }
        stale
    }
}
