//! MoonDeck Runner - Launch sequencing for remote Steam games
//!
//! This crate drives one game session on a GameStream host:
//! - `poller` - Generic status polling driven by a `Watchdog`
//! - `watchdog` - Readiness, launch and close watchdogs
//! - `launch` - Phases from "Steam is streamed" to "game closed"
//! - `connection` - Buddy login and GameStream pre-flight checks
//! - `run` - Moonlight lifecycle and the Moonlight vs. launch race
//! - `runner` - App id and host resolution, result persistence
//! - `collab` - Buddy, GameStream, Moonlight, settings and result collaborators
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       TopLevelRunner                         │
//! │        (app id, settings, result sink, spawned run)          │
//! ├──────────────────────────────────────────────────────────────┤
//! │                                                              │
//! │  ┌──────────────────────┐      ┌──────────────────────────┐  │
//! │  │     RunSequencer     │─────▶│  ConnectionEstablisher   │  │
//! │  │ (owns Buddy + client)│      │  (login, serverinfo)     │  │
//! │  └──────────┬───────────┘      └──────────────────────────┘  │
//! │             │ race                                           │
//! │             ▼                                                │
//! │  ┌──────────────────────┐      ┌──────────────────────────┐  │
//! │  │   LaunchSequencer    │─────▶│   poll_status + Watchdog │  │
//! │  │  (phases 1 to 5)     │      │   (Buddy status polls)   │  │
//! │  └──────────────────────┘      └──────────────────────────┘  │
//! │                                                              │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Every failure ends the run with exactly one `RunnerResult`

pub mod budget;
pub mod collab;
pub mod config;
pub mod connection;
pub mod error;
pub mod launch;
pub mod poller;
pub mod run;
pub mod runner;
pub mod watchdog;

// Re-export commonly used types
pub use config::{RunnerConfig, RunnerTimings};
pub use error::{RunError, RunOutcome};
pub use run::{DefaultSessionFactory, RunSequencer, SessionFactory};
pub use runner::{TopLevelRunner, APP_ID_ENV};
