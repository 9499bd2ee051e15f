//! TCP client for the Buddy service.
//!
//! One connection per run. Requests are strictly sequential: each
//! newline-delimited JSON request is answered by exactly one response line.
//! A transport failure drops the connection; later requests then fail fast
//! with `BuddyUnreachable` instead of reading out-of-sync responses.
//!
//! # Panic-Free Guarantees
//!
//! - No `.unwrap()`, `.expect()`, `panic!()`, `unreachable!()`, `todo!()`
//! - Every transport failure maps to a terminal `RunnerResult`

use std::io;
use std::time::Duration;

use async_trait::async_trait;
use moondeck_core::{AppId, RunnerResult, SessionStatus};
use moondeck_protocol::{BuddyRequest, BuddyResponse, ProtocolVersion};
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::Mutex;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::BuddyApi;
use crate::error::RunOutcome;

/// Failure of a single request/response exchange.
#[derive(Debug, Error)]
enum ExchangeError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),

    #[error("malformed message: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("connection closed by Buddy")]
    Closed,

    #[error("no response within {0:?}")]
    TimedOut(Duration),
}

impl ExchangeError {
    fn result(&self) -> RunnerResult {
        match self {
            Self::Malformed(_) => RunnerResult::BuddyRequestFailed,
            Self::Io(_) | Self::Closed | Self::TimedOut(_) => RunnerResult::BuddyUnreachable,
        }
    }
}

/// An open connection to Buddy.
struct Connection {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl Connection {
    fn new(stream: TcpStream) -> Self {
        let (reader, writer) = stream.into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Sends one request and reads its response line.
    async fn exchange(&mut self, request: &BuddyRequest) -> Result<BuddyResponse, ExchangeError> {
        let json = serde_json::to_string(request)?;
        self.writer.write_all(json.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        self.writer.flush().await?;

        let mut line = String::new();
        if self.reader.read_line(&mut line).await? == 0 {
            return Err(ExchangeError::Closed);
        }
        Ok(serde_json::from_str(line.trim())?)
    }
}

/// Client for the Buddy service running next to Steam on the host.
pub struct BuddyClient {
    address: String,
    port: u16,
    client_id: Option<String>,
    request_timeout: Duration,
    connection: Mutex<Option<Connection>>,
}

impl BuddyClient {
    /// Creates a client; no connection is made until [`BuddyApi::login`].
    #[must_use]
    pub fn new(
        address: impl Into<String>,
        port: u16,
        client_id: Option<String>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            address: address.into(),
            port,
            client_id,
            request_timeout,
            connection: Mutex::new(None),
        }
    }

    async fn connect(&self) -> RunOutcome<Connection> {
        let target = format!("{}:{}", self.address, self.port);
        debug!(address = %target, "Connecting to Buddy");

        match timeout(self.request_timeout, TcpStream::connect(&target)).await {
            Ok(Ok(stream)) => Ok(Connection::new(stream)),
            Ok(Err(e)) => {
                warn!(address = %target, error = %e, "Failed to connect to Buddy");
                Err(RunnerResult::BuddyUnreachable.into())
            }
            Err(_) => {
                warn!(address = %target, "Timed out connecting to Buddy");
                Err(RunnerResult::BuddyUnreachable.into())
            }
        }
    }

    /// Performs one exchange on the open connection.
    async fn request(&self, request: BuddyRequest) -> RunOutcome<BuddyResponse> {
        let mut guard = self.connection.lock().await;
        let Some(connection) = guard.as_mut() else {
            warn!(request = ?request.request, "Buddy request without an open session");
            return Err(RunnerResult::BuddyUnreachable.into());
        };

        let result = match timeout(self.request_timeout, connection.exchange(&request)).await {
            Ok(result) => result,
            Err(_) => Err(ExchangeError::TimedOut(self.request_timeout)),
        };

        result.map_err(|e| {
            warn!(
                request = ?request.request,
                error = %e,
                "Buddy request failed, dropping connection"
            );
            *guard = None;
            e.result().into()
        })
    }

    async fn request_ok(&self, request: BuddyRequest) -> RunOutcome {
        match self.request(request).await? {
            BuddyResponse::Ok => Ok(()),
            other => Err(unexpected(other)),
        }
    }
}

/// Maps a response the caller did not ask for to a terminal result.
fn unexpected(response: BuddyResponse) -> crate::error::RunError {
    match response {
        BuddyResponse::Error { message, code } => {
            warn!(reason = %message, code = ?code, "Buddy returned an error");
        }
        other => {
            warn!(response = ?other, "Unexpected response from Buddy");
        }
    }
    RunnerResult::BuddyRequestFailed.into()
}

#[async_trait]
impl BuddyApi for BuddyClient {
    async fn login(&self) -> RunOutcome {
        let connection = self.connect().await?;
        *self.connection.lock().await = Some(connection);

        let request = BuddyRequest::login(self.client_id.clone());
        match self.request(request).await? {
            BuddyResponse::LoggedIn { protocol_version }
                if ProtocolVersion::CURRENT.is_compatible_with(&protocol_version) =>
            {
                info!(protocol_version = %protocol_version, "Logged in to Buddy");
                Ok(())
            }
            BuddyResponse::LoggedIn { protocol_version } => {
                warn!(
                    runner_version = %ProtocolVersion::CURRENT,
                    buddy_version = %protocol_version,
                    "Buddy protocol version is not compatible"
                );
                Err(RunnerResult::BuddyVersionMismatch.into())
            }
            BuddyResponse::Rejected {
                reason,
                protocol_version,
            } => {
                warn!(reason = %reason, buddy_version = %protocol_version, "Buddy rejected login");
                if ProtocolVersion::CURRENT.is_compatible_with(&protocol_version) {
                    Err(RunnerResult::BuddyRequestFailed.into())
                } else {
                    Err(RunnerResult::BuddyVersionMismatch.into())
                }
            }
            other => Err(unexpected(other)),
        }
    }

    async fn steam_status(&self) -> RunOutcome<SessionStatus> {
        match self.request(BuddyRequest::get_steam_status()).await? {
            BuddyResponse::SteamStatus { status } => Ok(status.into()),
            other => Err(unexpected(other)),
        }
    }

    async fn launch_app(&self, app_id: AppId) -> RunOutcome {
        self.request_ok(BuddyRequest::launch_app(app_id)).await
    }

    async fn close_steam(&self) -> RunOutcome {
        self.request_ok(BuddyRequest::close_steam()).await
    }

    async fn disconnect(&self) {
        if let Some(mut connection) = self.connection.lock().await.take() {
            if let Err(e) = connection.writer.shutdown().await {
                debug!(error = %e, "Error closing Buddy connection");
            }
            debug!("Disconnected from Buddy");
        }
    }
}
