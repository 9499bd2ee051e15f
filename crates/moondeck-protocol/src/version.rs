//! Protocol versioning for safe upgrades of the runner and Buddy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Version of the Buddy wire protocol, exchanged at login.
///
/// Buddy reports its own version in `logged_in` and `rejected` responses;
/// the runner refuses to go on with a different major version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProtocolVersion {
    pub major: u16,
    pub minor: u16,
}

impl ProtocolVersion {
    /// Version spoken by this runner.
    pub const CURRENT: ProtocolVersion = ProtocolVersion { major: 1, minor: 0 };

    pub const fn new(major: u16, minor: u16) -> Self {
        Self { major, minor }
    }

    /// Returns true if Buddy running `other` can serve this runner.
    ///
    /// Major versions must match; minor versions only add messages.
    pub fn is_compatible_with(&self, other: &ProtocolVersion) -> bool {
        self.major == other.major
    }
}

impl Default for ProtocolVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
