// apiwatch-api: Async Rust client for the apiwatch monitoring service

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

mod endpoints;
mod logs;
mod stats;
mod upload;

pub use client::MonitorClient;
pub use error::Error;
pub use models::{
    Confirmation, Created, DEFAULT_LOG_LIMIT, EndpointId, ImportSummary, LogEntry, LogQuery,
    MAX_LOG_LIMIT, MonitoredEndpoint, OverviewSummary, Status,
};
pub use transport::{TlsMode, TransportConfig};
