// Wire models for the monitoring service.
//
// Field names match the service's JSON. Everything the prober fills in
// lazily is optional: a freshly registered endpoint has no status, latency,
// or check time until its first probe completes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default number of log entries requested per endpoint.
pub const DEFAULT_LOG_LIMIT: u32 = 200;

/// Upper bound the service accepts for `limit`.
pub const MAX_LOG_LIMIT: u32 = 2000;

// ── Identifiers ─────────────────────────────────────────────────────

/// Server-assigned endpoint identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointId(pub i64);

impl fmt::Display for EndpointId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for EndpointId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

// ── Status ──────────────────────────────────────────────────────────

/// Last probe outcome. Anything the service reports that is not `UP` or
/// `DOWN` (including `null` or a missing field) is `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Status {
    Up,
    Down,
    #[default]
    Unknown,
}

impl Status {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Unknown => "UNKNOWN",
        }
    }

    fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "UP" => Self::Up,
            "DOWN" => Self::Down,
            _ => Self::Unknown,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Status {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Status {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().map_or(Self::Unknown, Self::parse))
    }
}

// ── Entities ────────────────────────────────────────────────────────

/// A user-registered URL and the latest probe result the service recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonitoredEndpoint {
    pub id: EndpointId,
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub last_status: Status,
    /// Seconds.
    #[serde(default)]
    pub last_latency: Option<f64>,
    #[serde(default)]
    pub last_status_code: Option<u16>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub last_checked_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub last_alert_at: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub created_at: Option<DateTime<Utc>>,
}

/// One historical probe result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: i64,
    #[serde(default)]
    pub api_id: Option<EndpointId>,
    #[serde(default, deserialize_with = "timestamp::deserialize")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: Status,
    #[serde(default)]
    pub status_code: Option<u16>,
    /// Seconds.
    #[serde(default)]
    pub latency: Option<f64>,
    /// Response body snippet captured by the prober.
    #[serde(default)]
    pub response: Option<String>,
}

/// Aggregate counts by status, recomputed by the service on every request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverviewSummary {
    pub total: u64,
    pub up: u64,
    pub down: u64,
}

impl OverviewSummary {
    /// Endpoints that have not been probed yet (or reported something else).
    pub fn unknown(&self) -> u64 {
        self.total.saturating_sub(self.up).saturating_sub(self.down)
    }
}

/// Result of a bulk import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub added: u64,
    pub skipped: u64,
}

/// Bare acknowledgement body, e.g. `{"ok": true}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Confirmation {
    #[serde(default)]
    pub ok: bool,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// What `POST /apis` returned: the created record, or only an acknowledgement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Created {
    Endpoint(MonitoredEndpoint),
    Acknowledged(Confirmation),
}

impl Created {
    pub fn endpoint(&self) -> Option<&MonitoredEndpoint> {
        match self {
            Self::Endpoint(endpoint) => Some(endpoint),
            Self::Acknowledged(_) => None,
        }
    }
}

// ── Requests ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize)]
pub(crate) struct CreateEndpointRequest<'a> {
    pub name: &'a str,
    pub url: &'a str,
}

/// Parameters for `GET /apis/{id}/logs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogQuery {
    pub limit: u32,
    pub since: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
}

impl Default for LogQuery {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LOG_LIMIT,
            since: None,
            until: None,
        }
    }
}

impl LogQuery {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }

    /// `limit` clamped to what the service accepts.
    pub fn effective_limit(&self) -> u32 {
        self.limit.clamp(1, MAX_LOG_LIMIT)
    }

    /// Query pairs. Bounds use the service's SQL timestamp form, which it
    /// compares lexically against stored values.
    pub(crate) fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("limit", self.effective_limit().to_string())];
        if let Some(since) = self.since {
            pairs.push(("since", since.format(timestamp::SQL_FORMAT).to_string()));
        }
        if let Some(until) = self.until {
            pairs.push(("until", until.format(timestamp::SQL_FORMAT).to_string()));
        }
        pairs
    }
}

// ── Timestamps ──────────────────────────────────────────────────────

/// The service emits either RFC 3339 or SQLite's `CURRENT_TIMESTAMP` form
/// (`2026-02-02 12:34:56`, UTC). Unparseable values become `None`.
pub(crate) mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer};

    pub(crate) const SQL_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

    pub(crate) fn parse(raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        NAIVE_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
            .map(|naive| naive.and_utc())
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.as_deref().and_then(parse))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};
    use serde_json::json;

    #[test]
    fn status_is_lenient() {
        let s: Status = serde_json::from_value(json!("up")).unwrap();
        assert_eq!(s, Status::Up);
        let s: Status = serde_json::from_value(json!("DOWN")).unwrap();
        assert_eq!(s, Status::Down);
        let s: Status = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(s, Status::Unknown);
        let s: Status = serde_json::from_value(json!("DEGRADED")).unwrap();
        assert_eq!(s, Status::Unknown);
    }

    #[test]
    fn endpoint_without_probe_data() {
        let ep: MonitoredEndpoint = serde_json::from_value(json!({
            "id": 4,
            "name": "billing",
            "url": "https://billing.example.com/health",
            "created_at": "2026-02-02 12:34:56",
            "last_status": null,
            "last_latency": null,
            "last_checked_at": null
        }))
        .unwrap();

        assert_eq!(ep.id, EndpointId(4));
        assert_eq!(ep.last_status, Status::Unknown);
        assert!(ep.last_latency.is_none());
        assert!(ep.last_checked_at.is_none());
        let created = ep.created_at.unwrap();
        assert_eq!((created.year(), created.hour()), (2026, 12));
    }

    #[test]
    fn timestamp_formats() {
        assert!(timestamp::parse("2026-02-02T12:34:56Z").is_some());
        assert!(timestamp::parse("2026-02-02T12:34:56.123+02:00").is_some());
        assert!(timestamp::parse("2026-02-02 12:34:56").is_some());
        assert!(timestamp::parse("2026-02-02 12:34:56.250").is_some());
        assert!(timestamp::parse("2026-02-02T12:34:56.250").is_some());
        assert!(timestamp::parse("yesterday").is_none());
    }

    #[test]
    fn created_accepts_both_shapes() {
        let created: Created = serde_json::from_value(json!({"ok": true})).unwrap();
        assert!(created.endpoint().is_none());

        let created: Created = serde_json::from_value(json!({
            "id": 1, "name": "a", "url": "https://a.example.com"
        }))
        .unwrap();
        assert_eq!(created.endpoint().unwrap().name, "a");
    }

    #[test]
    fn overview_unknown_is_saturating() {
        let o = OverviewSummary {
            total: 5,
            up: 2,
            down: 1,
        };
        assert_eq!(o.unknown(), 2);
        let skewed = OverviewSummary {
            total: 1,
            up: 2,
            down: 1,
        };
        assert_eq!(skewed.unknown(), 0);
    }

    #[test]
    fn log_query_clamps_limit() {
        assert_eq!(LogQuery::with_limit(0).effective_limit(), 1);
        assert_eq!(LogQuery::with_limit(50_000).effective_limit(), MAX_LOG_LIMIT);
        assert_eq!(LogQuery::default().effective_limit(), DEFAULT_LOG_LIMIT);
    }

    #[test]
    fn log_query_bounds_use_sql_form() {
        let since = timestamp::parse("2026-02-02T08:00:00Z").unwrap();
        let query = LogQuery {
            limit: 10,
            since: Some(since),
            until: None,
        };
        let pairs = query.query_pairs();
        assert_eq!(pairs[1], ("since", "2026-02-02 08:00:00".to_string()));
        assert_eq!(since.minute(), 0);
    }
}
