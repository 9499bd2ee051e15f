//! Buddy request and response messages.
//!
//! Messages are newline-delimited JSON objects. Every request carries the
//! runner's protocol version; Buddy answers each request with exactly one
//! response.

use crate::version::ProtocolVersion;
use moondeck_core::{AppId, SessionStatus};
use serde::{Deserialize, Serialize};

/// Requests the runner can send to Buddy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RequestType {
    /// Open a session; Buddy answers with `LoggedIn` or `Rejected`
    Login {
        /// Client identifier from the user settings
        #[serde(skip_serializing_if = "Option::is_none")]
        client_id: Option<String>,
    },

    /// Query the Steam session status
    GetSteamStatus,

    /// Ask Steam to launch an app
    LaunchApp {
        /// App to launch
        app_id: AppId,
    },

    /// Ask Buddy to close Steam if it is still running
    CloseSteam,
}

/// Envelope for a request sent to Buddy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuddyRequest {
    /// Protocol version
    pub protocol_version: ProtocolVersion,

    /// Request payload
    #[serde(flatten)]
    pub request: RequestType,
}

impl BuddyRequest {
    /// Creates a new request with the current protocol version.
    pub fn new(request: RequestType) -> Self {
        Self {
            protocol_version: ProtocolVersion::CURRENT,
            request,
        }
    }

    pub fn login(client_id: Option<String>) -> Self {
        Self::new(RequestType::Login { client_id })
    }

    pub fn get_steam_status() -> Self {
        Self::new(RequestType::GetSteamStatus)
    }

    pub fn launch_app(app_id: AppId) -> Self {
        Self::new(RequestType::LaunchApp { app_id })
    }

    pub fn close_steam() -> Self {
        Self::new(RequestType::CloseSteam)
    }
}

/// Steam status exactly as Buddy reports it.
///
/// App ids use `0` for "none"; [`SessionStatus`] turns that into `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawSteamStatus {
    pub steam_is_running: bool,
    #[serde(default)]
    pub running_app_id: u32,
    #[serde(default)]
    pub last_launched_app_is_updating: u32,
}

impl From<RawSteamStatus> for SessionStatus {
    fn from(raw: RawSteamStatus) -> Self {
        SessionStatus {
            steam_is_running: raw.steam_is_running,
            running_app_id: AppId::from_wire(raw.running_app_id),
            updating_app_id: AppId::from_wire(raw.last_launched_app_is_updating),
        }
    }
}

/// Responses Buddy sends back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BuddyResponse {
    /// Login accepted
    LoggedIn {
        /// Buddy's protocol version
        protocol_version: ProtocolVersion,
    },

    /// Login refused (version mismatch, etc.)
    Rejected {
        /// Reason for rejection
        reason: String,
        /// Buddy's protocol version
        protocol_version: ProtocolVersion,
    },

    /// Steam status snapshot
    SteamStatus {
        #[serde(flatten)]
        status: RawSteamStatus,
    },

    /// Request accepted
    Ok,

    /// Request failed on the host
    Error {
        /// Error message
        message: String,
        /// Error code (optional)
        #[serde(skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
}

impl BuddyResponse {
    /// Creates an error response.
    pub fn error(message: &str) -> Self {
        Self::Error {
            message: message.to_string(),
            code: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_request_serialization() {
        let msg = BuddyRequest::launch_app(AppId::new(570).unwrap());
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"type\":\"launch_app\""));
        assert!(json.contains("\"app_id\":570"));

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["protocol_version"]["major"], 1);
    }

    #[test]
    fn test_login_omits_missing_client_id() {
        let json = serde_json::to_string(&BuddyRequest::login(None)).unwrap();
        assert!(!json.contains("client_id"));
    }

    #[test]
    fn test_steam_status_decodes_null_ids() {
        let json = r#"{
            "type": "steam_status",
            "steam_is_running": true,
            "running_app_id": 0,
            "last_launched_app_is_updating": 570
        }"#;
        let response: BuddyResponse = serde_json::from_str(json).unwrap();

        let BuddyResponse::SteamStatus { status } = response else {
            panic!("expected SteamStatus, got {response:?}");
        };
        let status = SessionStatus::from(status);
        assert!(status.steam_is_running);
        assert_eq!(status.running_app_id, None);
        assert_eq!(status.updating_app_id.map(AppId::get), Some(570));
    }

    #[test]
    fn test_error_response() {
        let response = BuddyResponse::error("steam is not running");
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"type\":\"error\""));
        assert!(!json.contains("code"));
    }
}
