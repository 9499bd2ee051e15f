//! GameStream `serverinfo` queries.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use moondeck_protocol::{parse_server_info, ServerInfo, ServerInfoError};
use tracing::{debug, error};

use super::HostInfoQuery;

/// Queries the GameStream HTTP endpoint of one host.
#[derive(Debug, Clone)]
pub struct GameStreamHostInfo {
    http: reqwest::Client,
    url: String,
}

impl GameStreamHostInfo {
    /// Creates a query for `address`, bounding each request by `request_timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(address: &str, port: u16, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http,
            url: format!("http://{address}:{port}/serverinfo"),
        })
    }

    async fn fetch(&self) -> Result<ServerInfo> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .context("serverinfo request failed")?;

        if !response.status().is_success() {
            anyhow::bail!("unexpected status {}", response.status());
        }

        let body = response
            .text()
            .await
            .context("Failed to read serverinfo body")?;
        Ok(parse_server_info(&body)?)
    }
}

#[async_trait]
impl HostInfoQuery for GameStreamHostInfo {
    async fn server_info(&self) -> Option<ServerInfo> {
        match self.fetch().await {
            Ok(info) => Some(info),
            Err(e) => {
                let parse_error = e.downcast_ref::<ServerInfoError>();
                if matches!(parse_error, Some(ServerInfoError::InvalidPattern(_))) {
                    error!(error = %e, "Cannot parse serverinfo responses");
                } else {
                    debug!(url = %self.url, error = %e, "GameStream did not answer");
                }
                None
            }
        }
    }
}
