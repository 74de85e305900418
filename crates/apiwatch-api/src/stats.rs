// Aggregate statistics and service liveness.

use serde::Deserialize;

use crate::client::MonitorClient;
use crate::error::Error;
use crate::models::OverviewSummary;

#[derive(Deserialize)]
struct Health {
    #[serde(default)]
    ok: bool,
}

impl MonitorClient {
    /// Counts of endpoints by status.
    ///
    /// `GET /stats/overview`
    pub async fn fetch_overview(&self) -> Result<OverviewSummary, Error> {
        let url = self.url("stats/overview")?;
        self.get(url, &[]).await
    }

    /// Whether the service reports itself healthy.
    ///
    /// `GET /health` -> `{"ok": true}`. Transport failures are errors; a
    /// reachable service that answers `ok: false` is `Ok(false)`.
    pub async fn health(&self) -> Result<bool, Error> {
        let url = self.url("health")?;
        let health: Health = self.get(url, &[]).await?;
        Ok(health.ok)
    }
}
