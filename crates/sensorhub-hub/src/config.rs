//! Hub configuration loaded from TOML.
//!
//! ```toml
//! protocol = "checksummed"   # or "header" for legacy activation headers
//! max_payload_len = 64       # optional, 1..=255
//! hold_ms = 5000             # optional, auto-clear after the last activation
//!
//! [[devices]]
//! identifier = "0x0001"      # hex string or integer
//! name = "Meeting room"
//! ```

use sensorhub_core::constants::{DEFAULT_MAX_PAYLOAD_LEN, MAX_WIRE_PAYLOAD_LEN};
use sensorhub_core::{DeviceId, Error, Result};
use sensorhub_protocol::{AnyFrameReader, WireFormat};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::hold::HoldTimer;
use crate::registry::DeviceRegistry;

/// One `[[devices]]` entry.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DeviceConfig {
    /// Identifier the sensor reports with.
    pub identifier: DeviceId,

    /// Display name, defaults to "Sensor <identifier>".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl DeviceConfig {
    /// Name to register the sensor under.
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| format!("Sensor {}", self.identifier))
    }
}

/// Top-level hub configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HubConfig {
    /// Wire format spoken by the hub.
    #[serde(default)]
    pub protocol: WireFormat,

    /// Largest payload the checksummed reader accepts.
    #[serde(default = "default_max_payload_len")]
    pub max_payload_len: usize,

    /// Auto-clear delay in milliseconds. Absent disables auto-clear.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hold_ms: Option<u64>,

    /// Sensors paired with the hub.
    #[serde(default)]
    pub devices: Vec<DeviceConfig>,
}

fn default_max_payload_len() -> usize {
    DEFAULT_MAX_PAYLOAD_LEN
}

impl HubConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `Error::Config` for malformed TOML or out-of-range values and
    /// `Error::MissingConfig` if no device is configured.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: HubConfig =
            toml::from_str(content).map_err(|e| Error::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content).map_err(|e| match e {
            Error::Config(message) => Error::Config(format!("{}: {}", path.display(), message)),
            other => other,
        })?;

        info!(
            "Loaded {} with {} device(s), protocol {}",
            path.display(),
            config.devices.len(),
            config.protocol
        );
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// Duplicate identifiers are reported by [`build_registry`](Self::build_registry).
    pub fn validate(&self) -> Result<()> {
        if self.max_payload_len == 0 || self.max_payload_len > MAX_WIRE_PAYLOAD_LEN {
            return Err(Error::Config(format!(
                "max_payload_len must be between 1 and {}, got {}",
                MAX_WIRE_PAYLOAD_LEN, self.max_payload_len
            )));
        }

        if self.hold_ms == Some(0) {
            return Err(Error::Config("hold_ms must be greater than zero".to_string()));
        }

        if self.devices.is_empty() {
            return Err(Error::MissingConfig("devices".to_string()));
        }

        Ok(())
    }

    /// Register every configured device.
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateIdentifier` if two entries share an identifier.
    pub fn build_registry(&self) -> Result<DeviceRegistry> {
        let mut registry = DeviceRegistry::new();

        for device in &self.devices {
            let name = device.display_name();
            registry.register_device(device.identifier, name.as_str())?;
            info!("Registered sensor {} as '{}'", device.identifier, name);
        }

        Ok(registry)
    }

    /// Create a frame reader for the configured format.
    pub fn build_reader(&self) -> AnyFrameReader {
        self.protocol.reader(self.max_payload_len)
    }

    /// Configured auto-clear delay.
    pub fn hold_duration(&self) -> Option<Duration> {
        self.hold_ms.map(Duration::from_millis)
    }

    /// Create the auto-clear timer, if one is configured.
    pub fn hold_timer(&self) -> Option<HoldTimer> {
        self.hold_duration().map(HoldTimer::new)
    }
}
