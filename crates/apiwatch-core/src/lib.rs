//! Dashboard controller between `apiwatch-api` and the terminal UI.
//!
//! - **[`Dashboard`]**: owns the view-state, runs every gateway call, and
//!   publishes a fresh [`DashboardState`] snapshot through a
//!   `tokio::sync::watch` channel after each change. Cheaply cloneable.
//!
//! - **[`PollHandle`]**: scoped periodic refresh. Returned by
//!   [`Dashboard::start_polling`]; dropping it stops the timer. Only one
//!   poll runs per dashboard.
//!
//! Responses that arrive after a newer one has been applied, or logs that
//! belong to a selection the user has since left, are dropped instead of
//! overwriting the view.

pub mod config;
pub mod dashboard;
pub mod error;
pub mod poll;
pub mod state;

pub use config::DashboardConfig;
pub use dashboard::Dashboard;
pub use error::CoreError;
pub use poll::PollHandle;
pub use state::{DashboardState, FormEdit, FormField, FormInputs, LogView};

// Gateway types the UI renders directly.
pub use apiwatch_api::{
    EndpointId, ImportSummary, LogEntry, MonitoredEndpoint, OverviewSummary, Status, TlsMode,
};
