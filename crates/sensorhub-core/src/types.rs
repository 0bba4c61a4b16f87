use crate::{Result, error::Error};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// Device identifier (16-bit, big-endian on the wire)
///
/// Identifies one physical sensor unit paired with the hub. Parsed from
/// configuration as either a decimal integer or a `0x`-prefixed hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct DeviceId(u16);

impl DeviceId {
    /// Create a device ID. Every `u16` is a valid identifier.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        DeviceId(id)
    }

    /// Build a device ID from its big-endian wire representation.
    #[must_use]
    pub const fn from_be_bytes(bytes: [u8; 2]) -> Self {
        DeviceId(u16::from_be_bytes(bytes))
    }

    /// Get the raw device ID as u16.
    #[must_use]
    pub const fn as_u16(&self) -> u16 {
        self.0
    }

    /// Big-endian wire representation.
    #[must_use]
    pub const fn to_be_bytes(&self) -> [u8; 2] {
        self.0.to_be_bytes()
    }
}

impl From<u16> for DeviceId {
    fn from(id: u16) -> Self {
        DeviceId(id)
    }
}

impl fmt::Display for DeviceId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "0x{:04X}", self.0)
    }
}

impl std::str::FromStr for DeviceId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        let parsed = match trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            Some(hex) => u16::from_str_radix(hex, 16),
            None => trimmed.parse::<u16>(),
        };

        parsed.map(DeviceId).map_err(|_| Error::InvalidDeviceId {
            message: format!("'{s}' is not a 16-bit decimal or 0x-prefixed hex value"),
        })
    }
}

impl<'de> Deserialize<'de> for DeviceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Int(i64),
            Text(String),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Int(value) => u16::try_from(value)
                .map(DeviceId)
                .map_err(|_| de::Error::custom(format!("device identifier {value} out of range"))),
            Repr::Text(text) => text.parse().map_err(de::Error::custom),
        }
    }
}

/// Occupancy state of one sensor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyState {
    /// Zone clear (initial state of every registered sensor).
    #[default]
    Unoccupied,
    /// Presence detected.
    Occupied,
}

impl OccupancyState {
    /// Returns `true` if the zone is occupied.
    #[inline]
    #[must_use]
    pub fn is_occupied(self) -> bool {
        matches!(self, OccupancyState::Occupied)
    }
}

impl From<bool> for OccupancyState {
    fn from(occupied: bool) -> Self {
        if occupied {
            OccupancyState::Occupied
        } else {
            OccupancyState::Unoccupied
        }
    }
}

impl From<OccupancyState> for bool {
    fn from(state: OccupancyState) -> Self {
        state.is_occupied()
    }
}

impl fmt::Display for OccupancyState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            OccupancyState::Unoccupied => write!(f, "UNOCCUPIED"),
            OccupancyState::Occupied => write!(f, "OCCUPIED"),
        }
    }
}
