//! Steam and GameStream application identifiers.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DomainError;

// ============================================================================
// Steam App Id
// ============================================================================

/// Steam application identifier.
///
/// Opaque numeric id as reported by Steam on the host. The wire value `0`
/// means "no app" and is never stored in an `AppId`; it is decoded to `None`
/// by [`AppId::from_wire`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppId(u32);

impl AppId {
    /// The Steam client itself (Big Picture front-end).
    ///
    /// While Steam is idling on the host this is what it reports as running,
    /// so it counts as a "settled" state alongside the target app.
    pub const STEAM_FRONTEND: AppId = AppId(7);

    /// Wire value reported while Steam has not determined its running app yet.
    pub const NULL_WIRE_VALUE: u32 = 0;

    /// Creates an app id, rejecting the null wire value.
    pub fn new(id: u32) -> Result<Self, DomainError> {
        if id == Self::NULL_WIRE_VALUE {
            return Err(DomainError::InvalidFieldValue {
                field: "app_id".to_string(),
                value: id.to_string(),
                expected: "non-zero Steam app id".to_string(),
            });
        }
        Ok(Self(id))
    }

    /// Decodes a raw wire value, mapping the null sentinel to `None`.
    #[must_use]
    pub fn from_wire(id: u32) -> Option<Self> {
        (id != Self::NULL_WIRE_VALUE).then_some(Self(id))
    }

    /// Returns the raw numeric id.
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for AppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for AppId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let id = s
            .trim()
            .parse::<u32>()
            .map_err(|e| DomainError::ParseError {
                field: "app_id".to_string(),
                reason: e.to_string(),
            })?;
        Self::new(id)
    }
}

// ============================================================================
// GameStream App Id
// ============================================================================

/// Identifier GameStream reports as `currentgame` in its server info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameStreamAppId(pub u32);

impl fmt::Display for GameStreamAppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// `currentgame` value while nothing is being streamed.
pub const GAMESTREAM_IDLE_ID: GameStreamAppId = GameStreamAppId(0);

/// Default `currentgame` value of the Steam entry in the GameStream app list.
pub const GAMESTREAM_STEAM_ID: GameStreamAppId = GameStreamAppId(6395);
