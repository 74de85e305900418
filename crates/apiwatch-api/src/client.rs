// Monitoring service HTTP client
//
// Wraps `reqwest::Client` with base-URL joining and error mapping. The
// endpoint groups (endpoints, logs, stats, upload) are implemented as
// inherent methods in separate files to keep this module focused on
// transport mechanics.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::transport::TransportConfig;

/// Longest response body preview kept in error messages.
const BODY_PREVIEW: usize = 200;

/// Async client for the monitoring service's REST API.
///
/// Stateless apart from the base URL: every method issues exactly one
/// request, with no retry and no caching. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MonitorClient {
    http: reqwest::Client,
    base_url: Url,
}

impl MonitorClient {
    /// Create a client from a `TransportConfig`.
    ///
    /// `base_url` is the service root, e.g. `http://localhost:8001`. A
    /// trailing path segment is preserved, so services mounted under a
    /// prefix (`https://host/monitor/`) work too.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self::with_client(http, base_url))
    }

    /// Create a client with a pre-built `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, mut base_url: Url) -> Self {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Self { http, base_url }
    }

    /// The service base URL.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builders ─────────────────────────────────────────────────

    /// Resolve a service path (`apis/3/logs`) against the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request helpers ──────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> Result<T, Error> {
        debug!("GET {}", url);
        let resp = self.http.get(url).query(query).send().await?;
        self.parse_response(resp).await
    }

    pub(crate) async fn post_json<T: DeserializeOwned>(
        &self,
        url: Url,
        body: &(impl Serialize + Sync),
    ) -> Result<T, Error> {
        debug!("POST {}", url);
        let resp = self.http.post(url).json(body).send().await?;
        self.parse_response(resp).await
    }

    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        url: Url,
        form: reqwest::multipart::Form,
    ) -> Result<T, Error> {
        debug!("POST {} (multipart)", url);
        let resp = self.http.post(url).multipart(form).send().await?;
        self.parse_response(resp).await
    }

    pub(crate) async fn delete<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("DELETE {}", url);
        let resp = self.http.delete(url).send().await?;
        self.parse_response(resp).await
    }

    /// Map non-2xx responses to errors and decode 2xx bodies.
    ///
    /// An empty 2xx body decodes as `{}`, which a `Confirmation` accepts.
    async fn parse_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            let detail = extract_detail(&body);
            debug!(status = status.as_u16(), ?detail, "request failed");
            return Err(match (status.as_u16(), detail) {
                (404, detail) => Error::NotFound {
                    message: detail.unwrap_or_else(|| "Not found".into()),
                },
                (code, Some(message)) if code < 500 => Error::Validation {
                    status: code,
                    message,
                },
                (code, Some(message)) => Error::Server {
                    status: code,
                    message,
                },
                (code, None) => Error::Server {
                    status: code,
                    message: preview(&body)
                        .unwrap_or_else(|| status.canonical_reason().unwrap_or("").to_owned()),
                },
            });
        }

        let source = if body.trim().is_empty() {
            "{}"
        } else {
            body.as_str()
        };
        serde_json::from_str(source).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", &body[..floor(&body, BODY_PREVIEW)]),
            body,
        })
    }
}

/// Pull a user-facing message out of an error body's `detail` field.
///
/// Handles a plain string, FastAPI's validation list
/// (`[{"loc": [...], "msg": "...", "type": "..."}]`), and an object carrying
/// `msg` or `message`. Missing or `null` detail yields `None`.
pub(crate) fn extract_detail(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let detail = value.get("detail")?;
    let message = match detail {
        Value::String(s) => s.trim().to_owned(),
        Value::Array(items) => items
            .iter()
            .filter_map(message_of)
            .collect::<Vec<_>>()
            .join("; "),
        Value::Object(_) => message_of(detail).unwrap_or_else(|| detail.to_string()),
        Value::Null => return None,
        other => other.to_string(),
    };
    (!message.is_empty()).then_some(message)
}

fn message_of(item: &Value) -> Option<String> {
    match item {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map
            .get("msg")
            .or_else(|| map.get("message"))
            .and_then(Value::as_str)
            .map(str::to_owned),
        _ => None,
    }
}

fn preview(body: &str) -> Option<String> {
    let trimmed = body.trim();
    (!trimmed.is_empty()).then(|| trimmed[..floor(trimmed, BODY_PREVIEW)].to_owned())
}

/// Largest char boundary at or below `max`.
fn floor(s: &str, max: usize) -> usize {
    if s.len() <= max {
        return s.len();
    }
    (0..=max).rev().find(|&i| s.is_char_boundary(i)).unwrap_or(0)
}
