use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by [`Dashboard`](crate::Dashboard) operations.
///
/// Each one is also recorded as the dashboard's `last_error` string, so a
/// caller that only renders state can ignore the returned value.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Gateway ─────────────────────────────────────────────────────
    #[error(transparent)]
    Api(#[from] apiwatch_api::Error),

    // ── Local ───────────────────────────────────────────────────────
    /// Input rejected before any request was sent.
    #[error("{reason}")]
    Validation { field: &'static str, reason: String },

    /// The import file could not be read.
    #[error("Cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl CoreError {
    pub(crate) fn validation(field: &'static str, reason: impl Into<String>) -> Self {
        Self::Validation {
            field,
            reason: reason.into(),
        }
    }

    /// The wrapped gateway error, if this came from the service.
    pub fn api(&self) -> Option<&apiwatch_api::Error> {
        match self {
            Self::Api(e) => Some(e),
            _ => None,
        }
    }
}
