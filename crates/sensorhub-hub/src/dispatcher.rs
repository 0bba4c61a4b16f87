//! Routing of decoded occupancy reports to registered sensors.
//!
//! Each [`SensorHandle`](crate::SensorHandle) is a two-state machine,
//! `Unoccupied` (initial) and `Occupied`, driven only by dispatched events.
//! Reports that repeat the current state refresh the handle's timestamp but
//! are otherwise absorbed, so observers see transitions only.
//!
//! The dispatcher never clears a sensor on its own. Timed auto-clear is an
//! external policy, see [`HoldTimer`](crate::HoldTimer).

use chrono::{DateTime, Utc};
use sensorhub_core::DeviceId;
use sensorhub_protocol::OccupancyEvent;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::observer::{StateChange, StateObserver};
use crate::registry::DeviceRegistry;

/// What a dispatched event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The sensor changed state and the observer was notified.
    Transitioned(StateChange),

    /// The sensor already had the reported state.
    Unchanged(OccupancyEvent),

    /// No sensor is registered under the reported identifier.
    UnknownDevice(DeviceId),
}

impl DispatchOutcome {
    /// Identifier the dispatched event carried.
    pub fn device_id(&self) -> DeviceId {
        match self {
            Self::Transitioned(change) => change.device_id,
            Self::Unchanged(event) => event.device_id,
            Self::UnknownDevice(id) => *id,
        }
    }

    /// Reported presence for a known sensor, `None` for unknown devices.
    pub fn occupied(&self) -> Option<bool> {
        match self {
            Self::Transitioned(change) => Some(change.occupied),
            Self::Unchanged(event) => Some(event.occupied),
            Self::UnknownDevice(_) => None,
        }
    }

    /// Returns `true` if the event changed a sensor's state.
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Transitioned(_))
    }
}

/// Dispatcher counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DispatchStats {
    /// Events handed to the dispatcher.
    pub dispatched: u64,

    /// Events that changed a sensor's state.
    pub transitions: u64,

    /// Events that repeated the current state.
    pub unchanged: u64,

    /// Events for identifiers missing from the registry.
    pub unknown_devices: u64,
}

/// Applies occupancy events to the registry and notifies an observer.
#[derive(Debug)]
pub struct OccupancyDispatcher<O> {
    observer: O,
    stats: DispatchStats,
}

impl<O: StateObserver> OccupancyDispatcher<O> {
    /// Create a dispatcher reporting to `observer`.
    pub fn new(observer: O) -> Self {
        Self {
            observer,
            stats: DispatchStats::default(),
        }
    }

    /// Apply `event`, stamping it with the current time.
    pub fn dispatch(
        &mut self,
        registry: &mut DeviceRegistry,
        event: OccupancyEvent,
    ) -> DispatchOutcome {
        self.dispatch_at(registry, event, Utc::now())
    }

    /// Apply `event` as if it arrived at `timestamp`.
    pub fn dispatch_at(
        &mut self,
        registry: &mut DeviceRegistry,
        event: OccupancyEvent,
        timestamp: DateTime<Utc>,
    ) -> DispatchOutcome {
        self.stats.dispatched += 1;

        let Some(handle) = registry.lookup_mut(event.device_id) else {
            self.stats.unknown_devices += 1;
            warn!("Dropping report from unknown device {}", event.device_id);
            return DispatchOutcome::UnknownDevice(event.device_id);
        };

        if !handle.apply(event.state(), timestamp) {
            self.stats.unchanged += 1;
            debug!("{} still {}", handle.name(), handle.state());
            return DispatchOutcome::Unchanged(event);
        }

        self.stats.transitions += 1;
        info!("{} ({}) is now {}", handle.name(), handle.id(), handle.state());

        let change = StateChange {
            device_id: event.device_id,
            occupied: event.occupied,
            timestamp,
        };
        self.observer.on_state_change(&change);
        DispatchOutcome::Transitioned(change)
    }
}

impl<O> OccupancyDispatcher<O> {
    /// Counters accumulated since creation.
    pub fn stats(&self) -> DispatchStats {
        self.stats
    }

    /// Borrow the observer.
    pub fn observer(&self) -> &O {
        &self.observer
    }

    /// Mutably borrow the observer.
    pub fn observer_mut(&mut self) -> &mut O {
        &mut self.observer
    }

    /// Consume the dispatcher, returning its observer.
    pub fn into_observer(self) -> O {
        self.observer
    }
}
