use thiserror::Error;

/// Top-level error type for the `apiwatch-api` crate.
///
/// Every failure a gateway call can produce: the request never reached the
/// service, the service answered with a non-2xx status (with or without a
/// user-facing `detail`), or the input was rejected before sending.
/// `apiwatch-core` turns these into the single message the dashboard shows.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// The request could not reach the service (connection refused, DNS, timeout).
    #[error("Cannot reach the monitoring service: {0}")]
    Network(#[from] reqwest::Error),

    /// URL construction failed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS or client construction error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Service responses ───────────────────────────────────────────
    /// Non-2xx response carrying no usable `detail`.
    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    /// Non-2xx response whose `detail` is meant for the user
    /// (duplicate endpoint, malformed URL, unreadable upload, ...).
    #[error("{message}")]
    Validation { status: u16, message: String },

    /// HTTP 404 -- the endpoint no longer exists.
    #[error("{message}")]
    NotFound { message: String },

    // ── Client-side ─────────────────────────────────────────────────
    /// Rejected locally; no request was sent.
    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    // ── Data ────────────────────────────────────────────────────────
    /// A 2xx body could not be decoded, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a "not found" error.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if the server rejected the request with a message for the user.
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidInput { .. })
    }

    /// Returns `true` if this is a transient error worth retrying on the next tick.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(e) => e.is_timeout() || e.is_connect(),
            Self::Server { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// HTTP status of the failed response, if one was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Server { status, .. } | Self::Validation { status, .. } => Some(*status),
            Self::NotFound { .. } => Some(404),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
