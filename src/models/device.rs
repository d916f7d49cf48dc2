// src/models/device.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::errors::DeviceError;
use crate::utilities::id_generator::generate_device_id;

/// Token length of the legacy binary protocol, in raw bytes.
pub const DEVICE_TOKEN_BYTES: usize = 32;

/// An installed application instance, identified by its push token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Device {
    pub id: String,
    pub token: String,
    pub last_registered_at: DateTime<Utc>,
}

impl Device {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            id: generate_device_id(),
            token: token.into(),
            last_registered_at: Utc::now(),
        }
    }

    /// Decodes the hex token into the 32 raw bytes the wire frame carries.
    /// Tokens may keep the space grouping Apple's device logs print.
    pub fn token_bytes(&self) -> Result<[u8; DEVICE_TOKEN_BYTES], DeviceError> {
        let compact: String = self.token.chars().filter(|c| *c != ' ').collect();
        let raw = hex::decode(compact)?;
        let len = raw.len();
        raw.try_into().map_err(|_| DeviceError::InvalidTokenLength(len))
    }
}
