//! Registry of the logical sensors paired with the hub.
//!
//! Handles live in an arena (`Vec<SensorHandle>`) in registration order,
//! with a `HashMap` index from identifier to slot. Nothing is ever removed,
//! so slots stay valid for the life of the registry.
//!
//! The registry is filled during startup and then moved into
//! [`HubContext`](crate::HubContext). From that point the set of
//! identifiers is fixed; only the per-handle occupancy state changes.

use chrono::{DateTime, Utc};
use sensorhub_core::{DeviceId, OccupancyState};
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::error::RegistrationError;

/// One logical occupancy sensor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SensorHandle {
    id: DeviceId,
    name: String,
    state: OccupancyState,
    last_update: Option<DateTime<Utc>>,
}

impl SensorHandle {
    /// Create a handle in the unoccupied state.
    pub fn new(id: DeviceId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            state: OccupancyState::default(),
            last_update: None,
        }
    }

    /// Identifier this sensor reports with.
    pub fn id(&self) -> DeviceId {
        self.id
    }

    /// Display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Current occupancy state.
    pub fn state(&self) -> OccupancyState {
        self.state
    }

    /// Returns `true` if the sensor currently reports presence.
    pub fn is_occupied(&self) -> bool {
        self.state.is_occupied()
    }

    /// Time of the last report, whether or not it changed the state.
    pub fn last_update(&self) -> Option<DateTime<Utc>> {
        self.last_update
    }

    /// Record a report. Returns `true` if the state changed.
    pub(crate) fn apply(&mut self, state: OccupancyState, at: DateTime<Utc>) -> bool {
        self.last_update = Some(at);
        if self.state == state {
            return false;
        }
        self.state = state;
        true
    }
}

impl fmt::Display for SensorHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.name, self.id, self.state)
    }
}

/// Mapping from device identifier to sensor handle.
///
/// # Examples
///
/// ```
/// use sensorhub_core::{DeviceId, OccupancyState};
/// use sensorhub_hub::DeviceRegistry;
///
/// let mut registry = DeviceRegistry::new();
/// registry.register_device(DeviceId::new(1), "Meeting room").unwrap();
///
/// let handle = registry.lookup(DeviceId::new(1)).unwrap();
/// assert_eq!(handle.name(), "Meeting room");
/// assert_eq!(handle.state(), OccupancyState::Unoccupied);
/// assert!(registry.lookup(DeviceId::new(2)).is_none());
/// ```
#[derive(Debug, Default)]
pub struct DeviceRegistry {
    handles: Vec<SensorHandle>,
    index: HashMap<DeviceId, usize>,
}

impl DeviceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handle` under `id`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateIdentifier`] if `id` is taken;
    /// the existing handle is kept. Returns
    /// [`RegistrationError::IdentifierMismatch`] if `handle` reports a
    /// different identifier than `id`.
    pub fn register(
        &mut self,
        id: DeviceId,
        handle: SensorHandle,
    ) -> Result<(), RegistrationError> {
        if handle.id != id {
            return Err(RegistrationError::IdentifierMismatch {
                key: id,
                handle: handle.id,
            });
        }

        if self.index.contains_key(&id) {
            return Err(RegistrationError::DuplicateIdentifier(id));
        }

        self.index.insert(id, self.handles.len());
        self.handles.push(handle);
        Ok(())
    }

    /// Create and register a fresh handle for `id`.
    pub fn register_device(
        &mut self,
        id: DeviceId,
        name: impl Into<String>,
    ) -> Result<(), RegistrationError> {
        self.register(id, SensorHandle::new(id, name))
    }

    /// Find the handle registered under `id`.
    pub fn lookup(&self, id: DeviceId) -> Option<&SensorHandle> {
        self.index.get(&id).map(|&slot| &self.handles[slot])
    }

    pub(crate) fn lookup_mut(&mut self, id: DeviceId) -> Option<&mut SensorHandle> {
        let slot = *self.index.get(&id)?;
        self.handles.get_mut(slot)
    }

    /// Returns `true` if a handle is registered under `id`.
    pub fn contains(&self, id: DeviceId) -> bool {
        self.index.contains_key(&id)
    }

    /// Current state of the sensor registered under `id`.
    pub fn state(&self, id: DeviceId) -> Option<OccupancyState> {
        self.lookup(id).map(SensorHandle::state)
    }

    /// Number of registered sensors.
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    /// Returns `true` if nothing is registered.
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Iterate over handles in registration order.
    pub fn iter(&self) -> std::slice::Iter<'_, SensorHandle> {
        self.handles.iter()
    }
}

impl<'a> IntoIterator for &'a DeviceRegistry {
    type Item = &'a SensorHandle;
    type IntoIter = std::slice::Iter<'a, SensorHandle>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
