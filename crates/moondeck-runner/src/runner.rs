//! Entry point of a runner invocation.

use moondeck_core::{AppId, RunnerResult};
use tracing::{error, info, warn};

use crate::collab::{ResultSink, SettingsStore};
use crate::error::{into_result, RunOutcome};
use crate::run::SessionFactory;

/// Environment variable carrying the Steam app id to launch.
pub const APP_ID_ENV: &str = "MOONDECK_STEAM_APP_ID";

/// Resolves the app id and host, runs the session, persists the result.
pub struct TopLevelRunner {
    settings: Box<dyn SettingsStore>,
    sink: Box<dyn ResultSink>,
    factory: Box<dyn SessionFactory>,
}

impl TopLevelRunner {
    pub fn new(
        settings: Box<dyn SettingsStore>,
        sink: Box<dyn ResultSink>,
        factory: Box<dyn SessionFactory>,
    ) -> Self {
        Self {
            settings,
            sink,
            factory,
        }
    }

    /// Runs once with the raw value of [`APP_ID_ENV`].
    ///
    /// The sink holds `ClosedPrematurely` until the run ends, so a runner
    /// killed midway leaves that behind.
    ///
    /// # Errors
    ///
    /// Returns an error only if the result cannot be persisted.
    pub async fn run(&self, raw_app_id: Option<&str>) -> anyhow::Result<Option<RunnerResult>> {
        self.sink
            .set_result(Some(RunnerResult::ClosedPrematurely), false)
            .await?;

        let result = into_result(self.execute(raw_app_id).await);

        self.sink.set_result(result, true).await?;
        Ok(result)
    }

    async fn execute(&self, raw_app_id: Option<&str>) -> RunOutcome {
        let app_id = parse_app_id(raw_app_id).ok_or(RunnerResult::NoAppId)?;

        let settings = self.settings.load().await?;
        let host = settings.selected_host().map_err(|e| {
            warn!(error = %e, "No usable host selected");
            RunnerResult::HostNotSelected
        })?;

        info!(
            %app_id,
            host_name = %host.host_name,
            address = %host.address,
            "Starting run"
        );
        let sequencer = self.factory.create(host, settings.client_id.clone())?;

        match tokio::spawn(sequencer.run(app_id)).await {
            Ok(None) => Ok(()),
            Ok(Some(result)) => Err(result.into()),
            Err(e) => {
                error!(error = %e, "Run task failed");
                Err(RunnerResult::Exception.into())
            }
        }
    }
}

fn parse_app_id(raw: Option<&str>) -> Option<AppId> {
    let Some(raw) = raw else {
        warn!(env = APP_ID_ENV, "App id is not set");
        return None;
    };

    match raw.parse::<AppId>() {
        Ok(app_id) => Some(app_id),
        Err(e) => {
            warn!(env = APP_ID_ENV, value = raw, error = %e, "Invalid app id");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_app_id() {
        assert_eq!(parse_app_id(Some(" 570 ")), AppId::new(570).ok());
        assert_eq!(parse_app_id(Some("0")), None);
        assert_eq!(parse_app_id(Some("dota")), None);
        assert_eq!(parse_app_id(None), None);
    }
}
