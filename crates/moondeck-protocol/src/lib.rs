//! MoonDeck Protocol - Wire formats spoken by the runner
//!
//! This crate provides the message types exchanged with the Buddy
//! service on the host, and parsing of the GameStream `serverinfo`
//! document.

pub mod message;
pub mod serverinfo;
pub mod version;

pub use message::{BuddyRequest, BuddyResponse, RawSteamStatus, RequestType};
pub use serverinfo::{parse_server_info, ServerInfo, ServerInfoError};
pub use version::ProtocolVersion;
