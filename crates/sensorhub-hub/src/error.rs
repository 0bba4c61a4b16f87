//! Error types for device registration.

use sensorhub_core::DeviceId;

/// Errors that can occur while populating the [`DeviceRegistry`](crate::DeviceRegistry).
///
/// Registration happens once at startup, so these are configuration
/// faults and are always reported to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    /// Another sensor already holds this identifier.
    #[error("Device identifier {0} is already registered")]
    DuplicateIdentifier(DeviceId),

    /// Handle was registered under a key different from its own identifier.
    #[error("Handle for {handle} cannot be registered under {key}")]
    IdentifierMismatch { key: DeviceId, handle: DeviceId },
}

impl From<RegistrationError> for sensorhub_core::Error {
    fn from(err: RegistrationError) -> Self {
        match err {
            RegistrationError::DuplicateIdentifier(id) => {
                sensorhub_core::Error::DuplicateIdentifier { id }
            }
            RegistrationError::IdentifierMismatch { .. } => {
                sensorhub_core::Error::InvalidDeviceId {
                    message: err.to_string(),
                }
            }
        }
    }
}
