//! State change notifications.
//!
//! The dispatcher reports every occupancy transition to a
//! [`StateObserver`]. Observers run synchronously on the ingestion thread,
//! so they must not block; [`ChannelObserver`] hands changes to async code
//! without waiting.

use chrono::{DateTime, Utc};
use sensorhub_core::{DeviceId, OccupancyState};
use serde::Serialize;
use std::fmt;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tracing::warn;

/// Occupancy transition of one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StateChange {
    /// Sensor whose state changed.
    pub device_id: DeviceId,

    /// New presence value.
    pub occupied: bool,

    /// Time the report that caused the change was dispatched.
    pub timestamp: DateTime<Utc>,
}

impl StateChange {
    /// New state as an [`OccupancyState`].
    pub fn state(&self) -> OccupancyState {
        OccupancyState::from(self.occupied)
    }
}

impl fmt::Display for StateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} -> {} at {}",
            self.device_id,
            self.state(),
            self.timestamp.to_rfc3339()
        )
    }
}

/// Receiver of occupancy transitions.
///
/// Called exactly once per transition and never for repeated reports of
/// the same state.
///
/// Closures implement this trait directly:
///
/// ```
/// use sensorhub_core::DeviceId;
/// use sensorhub_hub::{DeviceRegistry, OccupancyDispatcher, StateChange};
/// use sensorhub_protocol::OccupancyEvent;
///
/// let mut count = 0;
/// {
///     let mut dispatcher = OccupancyDispatcher::new(|_: &StateChange| count += 1);
///     let mut registry = DeviceRegistry::new();
///     registry.register_device(DeviceId::new(1), "Hall").unwrap();
///     dispatcher.dispatch(&mut registry, OccupancyEvent::new(DeviceId::new(1), true));
/// }
/// assert_eq!(count, 1);
/// ```
pub trait StateObserver {
    /// Handle one state transition.
    fn on_state_change(&mut self, change: &StateChange);
}

impl<F> StateObserver for F
where
    F: FnMut(&StateChange),
{
    fn on_state_change(&mut self, change: &StateChange) {
        self(change)
    }
}

/// Observer that ignores every change.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullObserver;

impl StateObserver for NullObserver {
    fn on_state_change(&mut self, _change: &StateChange) {}
}

/// Observer that keeps every change it sees, in order.
#[derive(Debug, Clone, Default)]
pub struct RecordingObserver {
    changes: Vec<StateChange>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Changes recorded so far.
    pub fn changes(&self) -> &[StateChange] {
        &self.changes
    }

    /// Number of changes recorded.
    pub fn len(&self) -> usize {
        self.changes.len()
    }

    /// Returns `true` if nothing was recorded.
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Take the recorded changes, leaving the recorder empty.
    pub fn take(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.changes)
    }
}

impl StateObserver for RecordingObserver {
    fn on_state_change(&mut self, change: &StateChange) {
        self.changes.push(*change);
    }
}

/// Observer that forwards changes into a bounded Tokio channel.
///
/// Uses `try_send`, so the ingestion thread never waits on the consumer.
/// If the channel is full or closed the change is logged and dropped.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: mpsc::Sender<StateChange>,
    dropped: u64,
}

impl ChannelObserver {
    /// Wrap an existing sender.
    pub fn new(tx: mpsc::Sender<StateChange>) -> Self {
        Self { tx, dropped: 0 }
    }

    /// Create an observer together with the receiving end of its channel.
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<StateChange>) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self::new(tx), rx)
    }

    /// Number of changes that could not be delivered.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

impl StateObserver for ChannelObserver {
    fn on_state_change(&mut self, change: &StateChange) {
        match self.tx.try_send(*change) {
            Ok(()) => {}
            Err(TrySendError::Full(change)) => {
                self.dropped += 1;
                warn!("State change channel full, dropping {}", change);
            }
            Err(TrySendError::Closed(change)) => {
                self.dropped += 1;
                warn!("State change channel closed, dropping {}", change);
            }
        }
    }
}
