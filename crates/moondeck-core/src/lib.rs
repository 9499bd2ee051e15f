//! MoonDeck Core - Shared types for the MoonDeck runner
//!
//! This crate provides the domain types shared between the Buddy
//! protocol crate and the runner itself.
//!
//! All code follows the panic-free policy: no `.unwrap()`, `.expect()`,
//! `panic!()`, `unreachable!()`, `todo!()`, or direct indexing `[i]`.

pub mod app;
pub mod error;
pub mod result;
pub mod settings;
pub mod status;

// Re-exports for convenience
pub use app::{AppId, GameStreamAppId, GAMESTREAM_IDLE_ID, GAMESTREAM_STEAM_ID};
pub use error::{DomainError, DomainResult};
pub use result::RunnerResult;
pub use settings::{HostSettings, UserSettings};
pub use status::SessionStatus;
