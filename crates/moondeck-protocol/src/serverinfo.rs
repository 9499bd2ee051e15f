//! Parsing of the GameStream `serverinfo` document.
//!
//! Only `currentgame` is of interest to the runner; the rest of the XML
//! document is ignored.

use std::sync::LazyLock;

use moondeck_core::GameStreamAppId;
use regex::Regex;
use thiserror::Error;

static CURRENT_GAME: LazyLock<Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"<currentgame>\s*(\d+)\s*</currentgame>"));

/// Subset of the GameStream server info the runner uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServerInfo {
    /// App GameStream is currently streaming (`0` when idle)
    pub current_game: GameStreamAppId,
}

/// Errors that can occur while parsing server info.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServerInfoError {
    /// Document has no `currentgame` element
    #[error("serverinfo has no currentgame element")]
    MissingCurrentGame,

    /// `currentgame` is not a valid id
    #[error("invalid currentgame value: {0}")]
    InvalidCurrentGame(String),

    /// The `currentgame` pattern failed to compile
    #[error("currentgame pattern is invalid: {0}")]
    InvalidPattern(String),
}

fn current_game_regex() -> Result<&'static Regex, ServerInfoError> {
    CURRENT_GAME
        .as_ref()
        .map_err(|e| ServerInfoError::InvalidPattern(e.to_string()))
}

/// Extracts [`ServerInfo`] from a `serverinfo` XML body.
pub fn parse_server_info(body: &str) -> Result<ServerInfo, ServerInfoError> {
    let value = current_game_regex()?
        .captures(body)
        .and_then(|caps| caps.get(1))
        .ok_or(ServerInfoError::MissingCurrentGame)?
        .as_str();

    let id = value
        .parse::<u32>()
        .map_err(|_| ServerInfoError::InvalidCurrentGame(value.to_string()))?;

    Ok(ServerInfo {
        current_game: GameStreamAppId(id),
    })
}
