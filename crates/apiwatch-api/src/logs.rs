// Probe history for a single endpoint.

use crate::client::MonitorClient;
use crate::error::Error;
use crate::models::{EndpointId, LogEntry, LogQuery};

impl MonitorClient {
    /// Recent probe results for `id`, newest first.
    ///
    /// `GET /apis/{id}/logs?limit=N[&since=..][&until=..]`. The limit is
    /// clamped to the service's range and the result is never longer than
    /// it, even if the service ignores the parameter.
    pub async fn fetch_logs(&self, id: EndpointId, query: &LogQuery) -> Result<Vec<LogEntry>, Error> {
        let url = self.url(&format!("apis/{id}/logs"))?;
        let mut entries: Vec<LogEntry> = self.get(url, &query.query_pairs()).await?;
        entries.truncate(query.effective_limit() as usize);
        Ok(entries)
    }
}
