use std::time::Duration;

use apiwatch_api::{DEFAULT_LOG_LIMIT, TlsMode, TransportConfig};
use url::Url;

/// Runtime settings for a [`Dashboard`](crate::Dashboard).
///
/// Built by `apiwatch-config` from file, environment, and CLI layers.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Monitoring service root, e.g. `http://localhost:8001`.
    pub api_base: Url,
    /// Period of the background refresh.
    pub poll_interval: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Log entries fetched for the selected endpoint.
    pub log_limit: u32,
    pub tls: TlsMode,
}

impl DashboardConfig {
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(api_base: Url) -> Self {
        Self {
            api_base,
            poll_interval: Self::DEFAULT_POLL_INTERVAL,
            timeout: Self::DEFAULT_TIMEOUT,
            log_limit: DEFAULT_LOG_LIMIT,
            tls: TlsMode::System,
        }
    }

    pub(crate) fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls,
            ..TransportConfig::default()
        }
        .with_timeout(self.timeout)
    }
}
