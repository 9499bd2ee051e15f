//! User and host settings as stored by the MoonDeck front-end.
//!
//! The front-end owns `settings.json`; the runner only reads the parts it
//! needs, so unknown fields are ignored.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{DomainError, DomainResult};

/// Default port the Buddy service listens on.
pub const DEFAULT_BUDDY_PORT: u16 = 59999;

fn default_buddy_port() -> u16 {
    DEFAULT_BUDDY_PORT
}

/// Connection settings for one GameStream host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSettings {
    /// Name Moonlight knows the host by
    pub host_name: String,

    /// Host address (IP or DNS name)
    pub address: String,

    /// Port of the Buddy service on the host
    #[serde(default = "default_buddy_port")]
    pub buddy_port: u16,
}

/// The slice of user settings the runner cares about.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSettings {
    /// Currently selected host, if any
    #[serde(default)]
    pub current_host_id: Option<String>,

    /// Known hosts keyed by host id
    #[serde(default)]
    pub host_settings: HashMap<String, HostSettings>,

    /// Identifier this client presents to Buddy
    #[serde(default)]
    pub client_id: Option<String>,
}

impl UserSettings {
    /// Returns the settings of the currently selected host.
    ///
    /// # Errors
    ///
    /// - `DomainError::InvalidFieldValue` if no host is selected
    /// - `DomainError::HostNotFound` if the selected host has no settings
    pub fn selected_host(&self) -> DomainResult<&HostSettings> {
        let host_id = self
            .current_host_id
            .as_deref()
            .ok_or_else(|| DomainError::InvalidFieldValue {
                field: "currentHostId".to_string(),
                value: "null".to_string(),
                expected: "selected host id".to_string(),
            })?;

        self.host_settings
            .get(host_id)
            .ok_or_else(|| DomainError::HostNotFound {
                host_id: host_id.to_string(),
            })
    }
}
